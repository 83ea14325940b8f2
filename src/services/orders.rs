//! Order and checkout service

use crate::{
    error::AppResult,
    models::{
        enums::OrderStatus,
        order::{CheckoutRequest, CheckoutResponse, OrderDetails, PaymentTransition, WebhookRequest},
    },
    repository::{orders::OrderUpdate, Repository},
};

#[derive(Clone)]
pub struct OrdersService {
    repository: Repository,
}

impl OrdersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create an order; free orders complete and grant immediately
    pub async fn checkout(&self, user_id: &str, request: &CheckoutRequest) -> AppResult<CheckoutResponse> {
        let book_ids = request.distinct_book_ids()?;
        let order = self.repository.orders.checkout(user_id, &book_ids).await?;
        let is_completed = order.status == OrderStatus::Completed;

        if is_completed {
            tracing::info!("Order {} completed at checkout for {}", order.id, user_id);
        } else {
            tracing::info!("Order {} awaits payment of {}", order.id, order.total_price);
        }

        Ok(CheckoutResponse { order, is_completed })
    }

    /// Owner reports a manual bank transfer
    pub async fn manual_confirm(&self, order_id: i64, user_id: &str) -> AppResult<OrderDetails> {
        let order = self
            .repository
            .orders
            .transition(order_id, |order| {
                order.manual_confirm(user_id)?;
                Ok(OrderUpdate::Save)
            })
            .await?;
        tracing::info!("Order {} awaits transfer approval", order.id);
        self.repository.orders.details(order).await
    }

    pub async fn approve(&self, order_id: i64) -> AppResult<OrderDetails> {
        let order = self
            .repository
            .orders
            .transition(order_id, |order| {
                order.approve()?;
                Ok(OrderUpdate::SaveAndGrant)
            })
            .await?;
        tracing::info!("Order {} approved", order.id);
        self.repository.orders.details(order).await
    }

    pub async fn reject(&self, order_id: i64) -> AppResult<OrderDetails> {
        let order = self
            .repository
            .orders
            .transition(order_id, |order| {
                order.reject()?;
                Ok(OrderUpdate::Save)
            })
            .await?;
        tracing::info!("Order {} rejected", order.id);
        self.repository.orders.details(order).await
    }

    /// Apply a payment provider notification
    pub async fn process_payment(&self, request: &WebhookRequest) -> AppResult<OrderDetails> {
        let (order_id, outcome) = request.parts()?;
        let order = self
            .repository
            .orders
            .transition(order_id, |order| {
                Ok(match order.apply_payment(outcome) {
                    PaymentTransition::Completed => OrderUpdate::SaveAndGrant,
                    PaymentTransition::Cancelled => OrderUpdate::Save,
                    PaymentTransition::Unchanged => OrderUpdate::None,
                })
            })
            .await?;
        tracing::info!("Payment notification for order {}: now {}", order.id, order.status);
        self.repository.orders.details(order).await
    }

    pub async fn my_orders(&self, user_id: &str) -> AppResult<Vec<OrderDetails>> {
        self.repository.orders.list_by_user(user_id).await
    }

    /// Orders waiting for an administrator decision
    pub async fn pending(&self) -> AppResult<Vec<OrderDetails>> {
        self.repository
            .orders
            .list_by_status(OrderStatus::PendingApproval)
            .await
    }
}
