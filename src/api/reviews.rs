//! Review endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::review::{CreateReview, Review, ReviewPage, ReviewQuery},
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse, AuthenticatedUser};

/// Review a book
#[utoipa::path(
    post,
    path = "/api/books/{id}/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "User has already reviewed this book")
    )
)]
pub async fn add_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(book_id): ApiPath<i64>,
    ApiJson(request): ApiJson<CreateReview>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    request.validate()?;

    let review = state
        .services
        .reviews
        .add_review(book_id, &claims.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(review)))
}

/// List reviews of a book, newest first
#[utoipa::path(
    get,
    path = "/api/books/{id}/reviews",
    tag = "reviews",
    params(
        ("id" = i64, Path, description = "Book ID"),
        ReviewQuery
    ),
    responses(
        (status = 200, description = "Page of reviews", body = ReviewPage)
    )
)]
pub async fn list_reviews(
    State(state): State<crate::AppState>,
    ApiPath(book_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> AppResult<Json<ApiResponse<ReviewPage>>> {
    let page = state.services.reviews.list_reviews(book_id, &query).await?;
    Ok(ApiResponse::ok(page))
}

/// Delete one of the caller's reviews
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    state.services.reviews.delete_review(id, &claims.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
