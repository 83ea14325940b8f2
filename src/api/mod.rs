//! API handlers for BookX REST endpoints

pub mod books;
pub mod health;
pub mod openapi;
pub mod orders;
pub mod playlists;
pub mod reviews;
pub mod stats;
pub mod transactions;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::user::{Principal, UserClaims},
    AppState,
};

/// Envelope code of every successful response
pub const SUCCESS_CODE: u32 = 1000;

/// Success envelope wrapped around every JSON result
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u32,
    pub message: String,
    pub result: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(result: T) -> Json<Self> {
        Json(Self {
            code: SUCCESS_CODE,
            message: "Success".to_string(),
            result,
        })
    }
}

/// Extractor for authenticated user from bearer token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let claims = state.services.identity.authenticate(&token).await?;
        Ok(AuthenticatedUser(claims))
    }
}

/// Anonymous callers are accepted; a supplied token must still be valid
#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => {
                let claims = state.services.identity.authenticate(&token).await?;
                Ok(Principal::User(claims))
            }
            None => Ok(Principal::Anonymous),
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim().to_string()))
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))
}

/// `Json` whose rejections use the error envelope
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// `Path` whose rejections use the error envelope
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}

/// `Query` whose rejections use the error envelope
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/categories", get(books::get_categories))
        .route("/books/search/google", post(books::import_from_google))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // Reviews
        .route(
            "/books/:id/reviews",
            get(reviews::list_reviews).post(reviews::add_review),
        )
        .route("/reviews/:id", delete(reviews::delete_review))
        // Borrowing
        .route("/transactions", get(transactions::list_transactions))
        .route("/transactions/borrow", post(transactions::borrow_book))
        .route("/transactions/return/:id", post(transactions::return_book))
        .route("/transactions/my-history", get(transactions::my_history))
        .route("/transactions/approve/:id", post(transactions::approve_borrow))
        .route("/transactions/:id", delete(transactions::reject_borrow))
        // Playlists
        .route("/playlists", post(playlists::create_playlist))
        .route("/playlists/my", get(playlists::my_playlists))
        .route("/playlists/my-books", get(playlists::my_books))
        .route("/playlists/public", get(playlists::public_playlists))
        .route("/playlists/:id", get(playlists::get_playlist))
        .route("/playlists/:id/books", post(playlists::add_book))
        .route(
            "/playlists/:id/books/:book_id",
            post(playlists::add_book_by_path).delete(playlists::remove_book),
        )
        .route(
            "/playlists/playlists",
            get(playlists::my_playlists).post(playlists::create_playlist),
        )
        .route("/playlists/playlists/my-books", get(playlists::my_books))
        .route("/playlists/playlists/:id", get(playlists::get_playlist))
        .route("/playlists/playlists/:id/books", post(playlists::add_book))
        .route(
            "/playlists/playlists/:id/books/:book_id",
            post(playlists::add_book_by_path).delete(playlists::remove_book),
        )
        // Orders
        .route("/orders/checkout", post(orders::checkout))
        .route("/orders/my-orders", get(orders::my_orders))
        .route("/orders/:id/manual-confirm", post(orders::manual_confirm))
        .route("/orders/admin/orders", get(orders::pending_orders))
        .route("/orders/admin/orders/:id/approve", post(orders::approve_order))
        .route("/orders/admin/orders/:id/reject", post(orders::reject_order))
        .route("/orders/webhook/payment-confirm", post(orders::payment_webhook))
        // Statistics
        .route("/statistics/summary", get(stats::get_summary));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api", api)
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::{
        config::AppConfig,
        repository::Repository,
        services::{redis::RedisService, Services},
    };

    /// Router over storage that is never contacted
    fn test_router() -> Router {
        let config = AppConfig::default();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        let redis = RedisService::lazy(&config.redis.url).unwrap();
        let services = Services::new(Repository::new(pool), &config, redis).unwrap();

        create_router(AppState {
            services: Arc::new(services),
        })
    }

    async fn send(request: HttpRequest<Body>) -> (StatusCode, serde_json::Value) {
        let response = test_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(HttpRequest::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let request = HttpRequest::post("/api/orders/checkout")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"bookIds":[1]}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);
        assert_eq!(body["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_malformed_authorization_header() {
        let request = HttpRequest::get("/api/transactions/my-history")
            .header("authorization", "Basic abc")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_numeric_playlist_id() {
        let (status, body) = send(
            HttpRequest::get("/api/playlists/abc").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid Playlist ID");
    }

    #[tokio::test]
    async fn test_non_numeric_book_id() {
        let (status, body) = send(HttpRequest::get("/api/books/abc").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "Validation Error");
    }

    #[tokio::test]
    async fn test_webhook_rejects_incomplete_payload() {
        let request = HttpRequest::post("/api/orders/webhook/payment-confirm")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"status":"SUCCESS"}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid payload");
    }

    #[test]
    fn test_success_envelope() {
        let Json(envelope) = ApiResponse::ok(vec![1, 2]);
        let value = serde_json::to_value(envelope).unwrap();
        assert_eq!(value["code"], 1000);
        assert_eq!(value["message"], "Success");
        assert_eq!(value["result"], serde_json::json!([1, 2]));
    }
}
