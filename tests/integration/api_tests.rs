//! API integration tests
//!
//! Run against a live server with a reachable identity service:
//! `BOOKX_USER_TOKEN=... BOOKX_ADMIN_TOKEN=... cargo test -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3001";

fn token(var: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| panic!("{} must be set", var))
}

fn user_token() -> String {
    token("BOOKX_USER_TOKEN")
}

fn admin_token() -> String {
    token("BOOKX_ADMIN_TOKEN")
}

/// Create a book as admin and return its id
async fn create_book(client: &Client, body: Value) -> i64 {
    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .bearer_auth(admin_token())
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1000);
    body["result"]["id"].as_i64().expect("No book ID")
}

async fn delete_book(client: &Client, id: i64) {
    let _ = client
        .delete(format!("{}/api/books/{}", BASE_URL, id))
        .bearer_auth(admin_token())
        .send()
        .await;
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "UP");
}

#[tokio::test]
#[ignore]
async fn test_list_books_envelope() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/books?page=0&size=5", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 1000);
    assert_eq!(body["message"], "Success");
    assert!(body["result"]["data"].is_array());
    assert_eq!(body["result"]["currentPage"], 0);
    assert_eq!(body["result"]["pageSize"], 5);
}

#[tokio::test]
#[ignore]
async fn test_missing_book_returns_404() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/books/999999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 404);
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_restores_inventory() {
    let client = Client::new();
    let book_id = create_book(
        &client,
        json!({
            "title": "Borrowable",
            "author": "Tester",
            "totalQuantity": 1,
            "availableQuantity": 1
        }),
    )
    .await;

    let response = client
        .post(format!("{}/api/transactions/borrow", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "bookId": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    let transaction_id = body["result"]["id"].as_i64().expect("No transaction ID");

    // The only copy is out, so a second borrow is refused
    let response = client
        .post(format!("{}/api/transactions/borrow", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "bookId": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_client_error());

    let response = client
        .post(format!("{}/api/transactions/return/{}", BASE_URL, transaction_id))
        .bearer_auth(user_token())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["result"]["status"], "RETURNED");

    let book: Value = client
        .get(format!("{}/api/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["result"]["availableQuantity"], 1);

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_free_checkout_grants_my_purchases() {
    let client = Client::new();
    let book_id = create_book(
        &client,
        json!({ "title": "Free Book", "author": "Tester", "price": "0" }),
    )
    .await;

    let response = client
        .post(format!("{}/api/orders/checkout", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "bookIds": [book_id, book_id] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["result"]["isCompleted"], true);
    assert_eq!(body["result"]["order"]["status"], "COMPLETED");
    assert_eq!(body["result"]["order"]["items"].as_array().map(Vec::len), Some(1));

    let playlists: Value = client
        .get(format!("{}/api/playlists/my", BASE_URL))
        .bearer_auth(user_token())
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let purchases = playlists["result"]
        .as_array()
        .and_then(|all| all.iter().find(|p| p["name"] == "My Purchases"))
        .expect("My Purchases playlist missing");
    let playlist_id = purchases["id"].as_i64().expect("No playlist ID");

    let details: Value = client
        .get(format!("{}/api/playlists/{}", BASE_URL, playlist_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let contains_book = details["result"]["playlistBooks"]
        .as_array()
        .is_some_and(|books| books.iter().any(|entry| entry["bookId"] == book_id));
    assert!(contains_book);

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_paid_checkout_completes_on_webhook() {
    let client = Client::new();
    let book_id = create_book(
        &client,
        json!({ "title": "Paid Book", "author": "Tester", "price": "12.50" }),
    )
    .await;

    let body: Value = client
        .post(format!("{}/api/orders/checkout", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "bookIds": [book_id] }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["result"]["isCompleted"], false);
    assert_eq!(body["result"]["order"]["status"], "PENDING_PAYMENT");
    let order_id = body["result"]["order"]["id"].as_i64().expect("No order ID");

    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/orders/webhook/payment-confirm", BASE_URL))
            .json(&json!({ "orderId": order_id, "status": "SUCCESS" }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["result"]["status"], "COMPLETED");
    }

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_review_conflicts() {
    let client = Client::new();
    let book_id = create_book(&client, json!({ "title": "Reviewed", "author": "Tester" })).await;

    let review = json!({ "rating": 4, "comment": "Solid" });
    let response = client
        .post(format!("{}/api/books/{}/reviews", BASE_URL, book_id))
        .bearer_auth(user_token())
        .json(&review)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/api/books/{}/reviews", BASE_URL, book_id))
        .bearer_auth(user_token())
        .json(&review)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let book: Value = client
        .get(format!("{}/api/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["result"]["ratingsCount"], 1);

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_statistics_require_admin() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/statistics/summary", BASE_URL))
        .bearer_auth(user_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(format!("{}/api/statistics/summary", BASE_URL))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["result"]["totalBooks"].is_number());
    assert!(body["result"]["activeBorrows"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/orders/my-orders", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

async fn get_book(client: &Client, id: i64) -> Value {
    client
        .get(format!("{}/api/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

async fn post_review(client: &Client, token: &str, book_id: i64, rating: i64) -> Value {
    let response = client
        .post(format!("{}/api/books/{}/reviews", BASE_URL, book_id))
        .bearer_auth(token)
        .json(&json!({ "rating": rating }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    response.json().await.expect("Failed to parse response")
}

async fn my_order_count(client: &Client) -> usize {
    let body: Value = client
        .get(format!("{}/api/orders/my-orders", BASE_URL))
        .bearer_auth(user_token())
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    body["result"].as_array().map(Vec::len).expect("No order list")
}

#[tokio::test]
#[ignore]
async fn test_average_rating_is_mean_of_reviews() {
    let client = Client::new();
    let book_id = create_book(&client, json!({ "title": "Rated", "author": "Tester" })).await;

    post_review(&client, &user_token(), book_id, 4).await;
    post_review(&client, &admin_token(), book_id, 2).await;

    let book = get_book(&client, book_id).await;
    assert_eq!(book["result"]["ratingsCount"], 2);
    assert_eq!(book["result"]["averageRating"].as_f64(), Some(3.0));

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_deleting_only_review_resets_rating() {
    let client = Client::new();
    let book_id = create_book(&client, json!({ "title": "Unrated", "author": "Tester" })).await;

    let review = post_review(&client, &user_token(), book_id, 5).await;
    let review_id = review["result"]["id"].as_i64().expect("No review ID");

    let response = client
        .delete(format!("{}/api/reviews/{}", BASE_URL, review_id))
        .bearer_auth(user_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["result"]["ratingsCount"], 0);
    assert_eq!(book["result"]["averageRating"].as_f64(), Some(0.0));

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_free_book_can_be_checked_out_twice() {
    let client = Client::new();
    let book_id = create_book(
        &client,
        json!({ "title": "Free Twice", "author": "Tester", "price": "0" }),
    )
    .await;

    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/orders/checkout", BASE_URL))
            .bearer_auth(user_token())
            .json(&json!({ "bookIds": [book_id] }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["result"]["order"]["status"], "COMPLETED");
    }

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_checkout_with_unknown_book_creates_no_order() {
    let client = Client::new();
    let book_id = create_book(
        &client,
        json!({ "title": "Known", "author": "Tester", "price": "3.00" }),
    )
    .await;
    let orders_before = my_order_count(&client).await;

    let response = client
        .post(format!("{}/api/orders/checkout", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "bookIds": [book_id, 999999999] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Some books not found");
    assert_eq!(my_order_count(&client).await, orders_before);

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_playlist_names_may_repeat() {
    let client = Client::new();

    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/playlists", BASE_URL))
            .bearer_auth(user_token())
            .json(&json!({ "name": "My Purchases" }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["result"]["name"], "My Purchases");
    }

    // Grants still land in a single playlist of that name
    let book_id = create_book(
        &client,
        json!({ "title": "Granted", "author": "Tester", "price": "0" }),
    )
    .await;
    let response = client
        .post(format!("{}/api/orders/checkout", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "bookIds": [book_id] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let playlists: Value = client
        .get(format!("{}/api/playlists/my", BASE_URL))
        .bearer_auth(user_token())
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let purchase_ids: Vec<i64> = playlists["result"]
        .as_array()
        .expect("No playlist list")
        .iter()
        .filter(|p| p["name"] == "My Purchases")
        .filter_map(|p| p["id"].as_i64())
        .collect();
    assert!(purchase_ids.len() >= 2);

    let mut holders = 0;
    for playlist_id in purchase_ids {
        let details: Value = client
            .get(format!("{}/api/playlists/{}", BASE_URL, playlist_id))
            .bearer_auth(user_token())
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");
        let holds_book = details["result"]["playlistBooks"]
            .as_array()
            .is_some_and(|books| books.iter().any(|entry| entry["bookId"] == book_id));
        if holds_book {
            holders += 1;
        }
    }
    assert_eq!(holders, 1);

    delete_book(&client, book_id).await;
}
