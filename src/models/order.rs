//! Order, order item and checkout models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    book::Book,
    enums::{ItemType, OrderStatus, PaymentMethod},
};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: String,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome reported by the payment provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success,
    Failed,
    Other,
}

impl PaymentOutcome {
    pub fn parse(status: &str) -> Self {
        match status {
            "SUCCESS" => PaymentOutcome::Success,
            "FAILED" => PaymentOutcome::Failed,
            _ => PaymentOutcome::Other,
        }
    }
}

/// Effect of a payment notification on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTransition {
    /// Order completed now; library access must be granted
    Completed,
    Cancelled,
    Unchanged,
}

impl Order {
    /// Owner declares a manual bank transfer
    pub fn manual_confirm(&mut self, user_id: &str) -> AppResult<()> {
        if self.user_id != user_id {
            return Err(AppError::Authorization("Unauthorized".to_string()));
        }
        if self.status != OrderStatus::PendingPayment {
            return Err(AppError::BadRequest(
                "Order not in pending payment state".to_string(),
            ));
        }

        self.status = OrderStatus::PendingApproval;
        self.payment_method = PaymentMethod::ManualTransfer;
        Ok(())
    }

    pub fn approve(&mut self) -> AppResult<()> {
        self.ensure_pending_approval()?;
        self.status = OrderStatus::Completed;
        Ok(())
    }

    pub fn reject(&mut self) -> AppResult<()> {
        self.ensure_pending_approval()?;
        self.status = OrderStatus::Cancelled;
        Ok(())
    }

    fn ensure_pending_approval(&self) -> AppResult<()> {
        if self.status == OrderStatus::PendingApproval {
            Ok(())
        } else {
            Err(AppError::BadRequest("Order not pending approval".to_string()))
        }
    }

    /// Apply a payment provider notification. Terminal orders never change.
    pub fn apply_payment(&mut self, outcome: PaymentOutcome) -> PaymentTransition {
        match (outcome, self.status) {
            (PaymentOutcome::Success, OrderStatus::Completed) => PaymentTransition::Unchanged,
            (PaymentOutcome::Success, OrderStatus::Cancelled) => {
                tracing::warn!("Payment success received for cancelled order {}", self.id);
                PaymentTransition::Unchanged
            }
            (PaymentOutcome::Success, _) => {
                self.status = OrderStatus::Completed;
                self.payment_method = PaymentMethod::OnlineGateway;
                PaymentTransition::Completed
            }
            (PaymentOutcome::Failed, status) if status.is_terminal() => {
                PaymentTransition::Unchanged
            }
            (PaymentOutcome::Failed, _) => {
                self.status = OrderStatus::Cancelled;
                PaymentTransition::Cancelled
            }
            (PaymentOutcome::Other, _) => PaymentTransition::Unchanged,
        }
    }
}

/// Order line as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub book_id: i64,
    pub book_type: ItemType,
    pub price: Decimal,
}

/// Order line with the book's current title, author and cover
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetails {
    pub id: i64,
    pub order_id: i64,
    pub book_id: i64,
    pub book_type: ItemType,
    pub price: Decimal,
    pub title: Option<String>,
    pub author: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub id: i64,
    pub user_id: String,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemDetails>,
}

impl OrderDetails {
    pub fn new(order: Order, items: Vec<OrderItemDetails>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total_price: order.total_price,
            status: order.status,
            payment_method: order.payment_method,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items,
        }
    }
}

/// Price snapshot of one book at checkout
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub book_id: i64,
    pub book_type: ItemType,
    pub price: Decimal,
}

/// Price each book and total the order
pub fn price_items(books: &[Book]) -> (Vec<PricedItem>, Decimal) {
    let items: Vec<PricedItem> = books
        .iter()
        .map(|book| {
            let price = book.checkout_price();
            PricedItem {
                book_id: book.id,
                book_type: if price.is_zero() { ItemType::Free } else { ItemType::Paid },
                price,
            }
        })
        .collect();
    let total = items.iter().map(|item| item.price).sum();
    (items, total)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "bookIds must not be empty"))]
    pub book_ids: Vec<i64>,
}

impl CheckoutRequest {
    /// Positive ids in request order, without duplicates
    pub fn distinct_book_ids(&self) -> AppResult<Vec<i64>> {
        if self.book_ids.is_empty() || self.book_ids.iter().any(|id| *id <= 0) {
            return Err(AppError::Validation(
                "bookIds must be a non-empty list of positive integers".to_string(),
            ));
        }

        let mut ids = Vec::with_capacity(self.book_ids.len());
        for id in &self.book_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        Ok(ids)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: OrderDetails,
    pub is_completed: bool,
}

/// Payment provider notification
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub order_id: Option<i64>,
    /// SUCCESS or FAILED; other values are ignored
    pub status: Option<String>,
}

impl WebhookRequest {
    pub fn parts(&self) -> AppResult<(i64, PaymentOutcome)> {
        match (self.order_id, self.status.as_deref()) {
            (Some(order_id), Some(status)) if !status.is_empty() => {
                Ok((order_id, PaymentOutcome::parse(status)))
            }
            _ => Err(AppError::BadRequest("Invalid payload".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::sample_book;

    fn order(status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: 1,
            user_id: "alice".into(),
            total_price: Decimal::new(1000, 2),
            status,
            payment_method: PaymentMethod::None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_price_items() {
        let mut free = sample_book(1);
        free.price = None;
        let mut paid = sample_book(2);
        paid.price = Some(Decimal::new(1250, 2));
        let mut negative = sample_book(3);
        negative.price = Some(Decimal::new(-5, 0));

        let (items, total) = price_items(&[free, paid, negative]);
        assert_eq!(items[0].book_type, ItemType::Free);
        assert_eq!(items[1].book_type, ItemType::Paid);
        assert_eq!(items[1].price, Decimal::new(1250, 2));
        assert_eq!(items[2].book_type, ItemType::Free);
        assert_eq!(items[2].price, Decimal::ZERO);
        assert_eq!(total, Decimal::new(1250, 2));
    }

    #[test]
    fn test_all_free_totals_zero() {
        let (items, total) = price_items(&[sample_book(1), sample_book(2)]);
        assert_eq!(items.len(), 2);
        assert!(total.is_zero());
    }

    #[test]
    fn test_manual_confirm() {
        let mut o = order(OrderStatus::PendingPayment);
        assert!(matches!(o.manual_confirm("bob"), Err(AppError::Authorization(_))));
        o.manual_confirm("alice").unwrap();
        assert_eq!(o.status, OrderStatus::PendingApproval);
        assert_eq!(o.payment_method, PaymentMethod::ManualTransfer);

        let err = o.manual_confirm("alice").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Order not in pending payment state"));
    }

    #[test]
    fn test_approve_and_reject_require_pending_approval() {
        let mut o = order(OrderStatus::PendingPayment);
        assert!(o.approve().is_err());
        assert!(o.reject().is_err());

        o.status = OrderStatus::PendingApproval;
        o.approve().unwrap();
        assert_eq!(o.status, OrderStatus::Completed);

        let mut o = order(OrderStatus::PendingApproval);
        o.reject().unwrap();
        assert_eq!(o.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_payment_success_is_idempotent() {
        let mut o = order(OrderStatus::PendingPayment);
        assert_eq!(o.apply_payment(PaymentOutcome::Success), PaymentTransition::Completed);
        assert_eq!(o.status, OrderStatus::Completed);
        assert_eq!(o.payment_method, PaymentMethod::OnlineGateway);
        assert_eq!(o.apply_payment(PaymentOutcome::Success), PaymentTransition::Unchanged);
        assert_eq!(o.status, OrderStatus::Completed);
    }

    #[test]
    fn test_late_failure_does_not_cancel_completed() {
        let mut o = order(OrderStatus::Completed);
        assert_eq!(o.apply_payment(PaymentOutcome::Failed), PaymentTransition::Unchanged);
        assert_eq!(o.status, OrderStatus::Completed);
    }

    #[test]
    fn test_payment_failure_cancels_open_order() {
        let mut o = order(OrderStatus::PendingApproval);
        assert_eq!(o.apply_payment(PaymentOutcome::Failed), PaymentTransition::Cancelled);
        assert_eq!(o.status, OrderStatus::Cancelled);
        assert_eq!(o.apply_payment(PaymentOutcome::Success), PaymentTransition::Unchanged);
        assert_eq!(o.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_unknown_payment_status_is_ignored() {
        let mut o = order(OrderStatus::PendingPayment);
        assert_eq!(o.apply_payment(PaymentOutcome::parse("PROCESSING")), PaymentTransition::Unchanged);
        assert_eq!(o.status, OrderStatus::PendingPayment);
    }

    #[test]
    fn test_distinct_book_ids() {
        let request = CheckoutRequest { book_ids: vec![3, 1, 3, 2, 1] };
        assert_eq!(request.distinct_book_ids().unwrap(), vec![3, 1, 2]);
        assert!(CheckoutRequest { book_ids: vec![] }.distinct_book_ids().is_err());
        assert!(CheckoutRequest { book_ids: vec![1, 0] }.distinct_book_ids().is_err());
    }

    #[test]
    fn test_webhook_payload() {
        let full: WebhookRequest = serde_json::from_str(r#"{"orderId":5,"status":"SUCCESS"}"#).unwrap();
        assert_eq!(full.parts().unwrap(), (5, PaymentOutcome::Success));

        let missing: WebhookRequest = serde_json::from_str(r#"{"orderId":5}"#).unwrap();
        let err = missing.parts().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Invalid payload"));
    }
}
