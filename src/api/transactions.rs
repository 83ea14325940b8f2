//! Borrowing endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::transaction::{BorrowRequest, TransactionDetails, TransactionQuery},
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse, AuthenticatedUser};

/// Borrow a book
#[utoipa::path(
    post,
    path = "/api/transactions/borrow",
    tag = "transactions",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Borrow recorded", body = TransactionDetails),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book unavailable or already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<BorrowRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TransactionDetails>>)> {
    request.validate()?;

    let transaction = state
        .services
        .transactions
        .borrow(&claims.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(transaction)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/api/transactions/return/{id}",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = TransactionDetails),
        (status = 400, description = "Transaction is already closed"),
        (status = 403, description = "Not the borrower"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<TransactionDetails>>> {
    let transaction = state
        .services
        .transactions
        .return_book(&claims.user_id, id)
        .await?;
    Ok(ApiResponse::ok(transaction))
}

/// Borrow history of the caller
#[utoipa::path(
    get,
    path = "/api/transactions/my-history",
    tag = "transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrow records, newest first", body = Vec<TransactionDetails>)
    )
)]
pub async fn my_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<TransactionDetails>>>> {
    let history = state.services.transactions.my_history(&claims.user_id).await?;
    Ok(ApiResponse::ok(history))
}

/// All borrow records (admin)
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(TransactionQuery),
    responses(
        (status = 200, description = "Borrow records, newest first", body = Vec<TransactionDetails>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_transactions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> AppResult<Json<ApiResponse<Vec<TransactionDetails>>>> {
    claims.require_admin()?;

    let transactions = state.services.transactions.all(query.status).await?;
    Ok(ApiResponse::ok(transactions))
}

/// Approve a pending borrow request (admin)
#[utoipa::path(
    post,
    path = "/api/transactions/approve/{id}",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Borrow activated", body = TransactionDetails),
        (status = 400, description = "Transaction is not pending"),
        (status = 409, description = "Book is not available for borrowing")
    )
)]
pub async fn approve_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<TransactionDetails>>> {
    claims.require_admin()?;

    let transaction = state.services.transactions.approve(id).await?;
    Ok(ApiResponse::ok(transaction))
}

/// Reject a pending borrow request (admin)
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Borrow rejected", body = TransactionDetails),
        (status = 400, description = "Transaction is not pending")
    )
)]
pub async fn reject_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<TransactionDetails>>> {
    claims.require_admin()?;

    let transaction = state.services.transactions.reject(id).await?;
    Ok(ApiResponse::ok(transaction))
}
