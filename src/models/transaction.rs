//! Borrow transaction model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::TransactionStatus;
use crate::error::{AppError, AppResult};

/// Borrow record as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub book_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Open and past its due date
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, TransactionStatus::Active | TransactionStatus::Overdue)
            && self.due_date.map(|due| now > due).unwrap_or(false)
    }

    pub fn ensure_borrower(&self, user_id: &str) -> AppResult<()> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Unauthorized to return this transaction".to_string(),
            ))
        }
    }

    /// Close an active borrow, flagging late returns
    pub fn close(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.status != TransactionStatus::Active {
            return Err(AppError::BadRequest("Transaction is already closed".to_string()));
        }

        self.status = if self.is_overdue(now) {
            TransactionStatus::ReturnedOverdue
        } else {
            TransactionStatus::Returned
        };
        self.return_date = Some(now);
        Ok(())
    }

    /// Activate a pending borrow; the loan period restarts at approval time
    pub fn approve(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.ensure_pending()?;

        let duration = self
            .due_date
            .map(|due| due - self.borrow_date)
            .unwrap_or_else(|| Duration::days(0));
        self.borrow_date = now;
        self.due_date = Some(now + duration);
        self.status = TransactionStatus::Active;
        Ok(())
    }

    pub fn reject(&mut self) -> AppResult<()> {
        self.ensure_pending()?;
        self.status = TransactionStatus::Rejected;
        Ok(())
    }

    fn ensure_pending(&self) -> AppResult<()> {
        if self.status == TransactionStatus::Pending {
            Ok(())
        } else {
            Err(AppError::BadRequest("Transaction is not pending".to_string()))
        }
    }
}

/// Short book description embedded in borrow listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub thumbnail_url: Option<String>,
}

/// Borrow record with its book, as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub id: i64,
    pub user_id: String,
    pub book_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub is_overdue: bool,
    /// Absent when the book has since been deleted
    pub book: Option<BookSummary>,
}

impl TransactionDetails {
    pub fn new(transaction: Transaction, book: Option<BookSummary>, now: DateTime<Utc>) -> Self {
        Self {
            is_overdue: transaction.is_overdue(now),
            id: transaction.id,
            user_id: transaction.user_id,
            book_id: transaction.book_id,
            borrow_date: transaction.borrow_date,
            due_date: transaction.due_date,
            return_date: transaction.return_date,
            status: transaction.status,
            created_at: transaction.created_at,
            book,
        }
    }
}

/// Borrow request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    #[validate(range(min = 1, message = "bookId must be a positive integer"))]
    pub book_id: i64,
    /// Loan length in days (default 14)
    #[validate(range(min = 1, message = "days must be a positive integer"))]
    pub days: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    pub status: Option<TransactionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(due_in_days: i64) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: 1,
            user_id: "alice".into(),
            book_id: 7,
            borrow_date: now,
            due_date: Some(now + Duration::days(due_in_days)),
            return_date: None,
            status: TransactionStatus::Active,
            created_at: now,
        }
    }

    #[test]
    fn test_on_time_return() {
        let mut tx = active(14);
        let now = Utc::now();
        tx.close(now).unwrap();
        assert_eq!(tx.status, TransactionStatus::Returned);
        assert_eq!(tx.return_date, Some(now));
    }

    #[test]
    fn test_late_return() {
        let mut tx = active(-1);
        tx.close(Utc::now()).unwrap();
        assert_eq!(tx.status, TransactionStatus::ReturnedOverdue);
    }

    #[test]
    fn test_return_on_due_date_is_on_time() {
        let mut tx = active(0);
        let due = tx.due_date.unwrap();
        tx.close(due).unwrap();
        assert_eq!(tx.status, TransactionStatus::Returned);
    }

    #[test]
    fn test_second_return_rejected() {
        let mut tx = active(14);
        tx.close(Utc::now()).unwrap();
        let err = tx.close(Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Transaction is already closed"));
    }

    #[test]
    fn test_pending_cannot_be_returned() {
        let mut tx = active(14);
        tx.status = TransactionStatus::Pending;
        assert!(tx.close(Utc::now()).is_err());
    }

    #[test]
    fn test_only_borrower_may_return() {
        let tx = active(14);
        assert!(tx.ensure_borrower("alice").is_ok());
        assert!(matches!(tx.ensure_borrower("bob"), Err(AppError::Authorization(_))));
    }

    #[test]
    fn test_approve_keeps_requested_duration() {
        let mut tx = active(7);
        tx.status = TransactionStatus::Pending;
        let later = Utc::now() + Duration::days(3);
        tx.approve(later).unwrap();
        assert_eq!(tx.status, TransactionStatus::Active);
        assert_eq!(tx.borrow_date, later);
        assert_eq!(tx.due_date, Some(later + Duration::days(7)));
    }

    #[test]
    fn test_reject_requires_pending() {
        let mut tx = active(7);
        assert!(tx.reject().is_err());
        tx.status = TransactionStatus::Pending;
        tx.reject().unwrap();
        assert_eq!(tx.status, TransactionStatus::Rejected);
        assert!(tx.approve(Utc::now()).is_err());
    }

    #[test]
    fn test_overdue_flag() {
        let now = Utc::now();
        assert!(active(-2).is_overdue(now));
        assert!(!active(2).is_overdue(now));

        let mut returned = active(-2);
        returned.status = TransactionStatus::ReturnedOverdue;
        assert!(!returned.is_overdue(now));
    }
}
