//! Order and checkout endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::order::{CheckoutRequest, CheckoutResponse, OrderDetails, WebhookRequest},
};

use super::{ApiJson, ApiPath, ApiResponse, AuthenticatedUser};

/// Check out a list of books
#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    tag = "orders",
    security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = CheckoutResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Some books not found")
    )
)]
pub async fn checkout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CheckoutResponse>>)> {
    request.validate()?;

    let response = state.services.orders.checkout(&claims.user_id, &request).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(response)))
}

/// Orders of the caller
#[utoipa::path(
    get,
    path = "/api/orders/my-orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<OrderDetails>)
    )
)]
pub async fn my_orders(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<OrderDetails>>>> {
    let orders = state.services.orders.my_orders(&claims.user_id).await?;
    Ok(ApiResponse::ok(orders))
}

/// Declare a manual bank transfer for an order
#[utoipa::path(
    post,
    path = "/api/orders/{id}/manual-confirm",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order awaits approval", body = OrderDetails),
        (status = 400, description = "Order not in pending payment state"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn manual_confirm(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<OrderDetails>>> {
    let order = state.services.orders.manual_confirm(id, &claims.user_id).await?;
    Ok(ApiResponse::ok(order))
}

/// Orders awaiting approval (admin)
#[utoipa::path(
    get,
    path = "/api/orders/admin/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders pending approval", body = Vec<OrderDetails>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn pending_orders(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<OrderDetails>>>> {
    claims.require_admin()?;

    let orders = state.services.orders.pending().await?;
    Ok(ApiResponse::ok(orders))
}

/// Approve an order (admin)
#[utoipa::path(
    post,
    path = "/api/orders/admin/orders/{id}/approve",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order completed", body = OrderDetails),
        (status = 400, description = "Order not pending approval"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn approve_order(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<OrderDetails>>> {
    claims.require_admin()?;

    let order = state.services.orders.approve(id).await?;
    Ok(ApiResponse::ok(order))
}

/// Reject an order (admin)
#[utoipa::path(
    post,
    path = "/api/orders/admin/orders/{id}/reject",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order cancelled", body = OrderDetails),
        (status = 400, description = "Order not pending approval"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn reject_order(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<OrderDetails>>> {
    claims.require_admin()?;

    let order = state.services.orders.reject(id).await?;
    Ok(ApiResponse::ok(order))
}

/// Payment provider notification
#[utoipa::path(
    post,
    path = "/api/orders/webhook/payment-confirm",
    tag = "orders",
    request_body = WebhookRequest,
    responses(
        (status = 200, description = "Order after the notification", body = OrderDetails),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn payment_webhook(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<WebhookRequest>,
) -> AppResult<Json<ApiResponse<OrderDetails>>> {
    let order = state.services.orders.process_payment(&request).await?;
    Ok(ApiResponse::ok(order))
}
