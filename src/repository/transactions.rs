//! Borrow transactions repository for database operations

use chrono::{Duration, Utc};
use sqlx::{postgres::PgRow, FromRow, PgConnection, Pool, Postgres, Row};

use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::{
        enums::TransactionStatus,
        transaction::{BookSummary, Transaction, TransactionDetails},
    },
};

use super::books::{lock_book, save_inventory};

const ALREADY_BORROWED: &str = "User already has this book borrowed";

const DETAILS_QUERY: &str = r#"
    SELECT t.*,
           b.id AS summary_id, b.title AS summary_title,
           b.author AS summary_author, b.thumbnail_url AS summary_thumbnail_url
    FROM transactions t
    LEFT JOIN books b ON b.id = t.book_id
"#;

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow history of a user, newest first
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<TransactionDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE t.user_id = $1 ORDER BY t.created_at DESC, t.id DESC",
            DETAILS_QUERY
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(details_from_row).collect()
    }

    /// Every borrow record, newest first, optionally filtered by status
    pub async fn list_all(&self, status: Option<TransactionStatus>) -> AppResult<Vec<TransactionDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE ($1::text IS NULL OR t.status = $1) ORDER BY t.created_at DESC, t.id DESC",
            DETAILS_QUERY
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(details_from_row).collect()
    }

    /// Record a borrow. Without approval the copy leaves stock immediately;
    /// with approval the record waits as PENDING and stock is untouched.
    pub async fn borrow(
        &self,
        user_id: &str,
        book_id: i64,
        days: i64,
        requires_approval: bool,
    ) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let mut book = lock_book(&mut *tx, book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        book.ensure_borrowable()?;

        let already_borrowed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM transactions
                WHERE user_id = $1 AND book_id = $2 AND status IN ('PENDING', 'ACTIVE')
            )
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_borrowed {
            return Err(AppError::Conflict(ALREADY_BORROWED.to_string()));
        }

        let status = if requires_approval {
            TransactionStatus::Pending
        } else {
            book.take_copy();
            save_inventory(&mut *tx, &book).await?;
            TransactionStatus::Active
        };

        let now = Utc::now();
        let created = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, book_id, borrow_date, due_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .bind(now + Duration::days(days))
        .bind(status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, ALREADY_BORROWED))?;

        tx.commit().await?;

        Ok(created)
    }

    /// Close a borrow and put the copy back in stock
    pub async fn return_book(&self, id: i64, user_id: &str) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let mut transaction = lock_transaction(&mut *tx, id).await?;
        transaction.ensure_borrower(user_id)?;
        transaction.close(Utc::now())?;
        save_transaction(&mut *tx, &transaction).await?;

        match lock_book(&mut *tx, transaction.book_id).await? {
            Some(mut book) => {
                book.return_copy();
                save_inventory(&mut *tx, &book).await?;
            }
            None => {
                tracing::warn!(
                    "Book {} returned through transaction {} no longer exists",
                    transaction.book_id,
                    transaction.id
                );
            }
        }

        tx.commit().await?;

        Ok(transaction)
    }

    /// Activate a pending borrow, taking the copy out of stock
    pub async fn approve(&self, id: i64) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let mut transaction = lock_transaction(&mut *tx, id).await?;
        transaction.approve(Utc::now())?;

        let mut book = lock_book(&mut *tx, transaction.book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        book.ensure_borrowable()?;
        book.take_copy();
        save_inventory(&mut *tx, &book).await?;
        save_transaction(&mut *tx, &transaction).await?;

        tx.commit().await?;

        Ok(transaction)
    }

    pub async fn reject(&self, id: i64) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let mut transaction = lock_transaction(&mut *tx, id).await?;
        transaction.reject()?;
        save_transaction(&mut *tx, &transaction).await?;

        tx.commit().await?;

        Ok(transaction)
    }

    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE status IN ('ACTIVE', 'OVERDUE')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

async fn lock_transaction(conn: &mut PgConnection, id: i64) -> AppResult<Transaction> {
    sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))
}

async fn save_transaction(conn: &mut PgConnection, transaction: &Transaction) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE transactions
        SET borrow_date = $2, due_date = $3, return_date = $4, status = $5
        WHERE id = $1
        "#,
    )
    .bind(transaction.id)
    .bind(transaction.borrow_date)
    .bind(transaction.due_date)
    .bind(transaction.return_date)
    .bind(transaction.status)
    .execute(conn)
    .await?;
    Ok(())
}

fn details_from_row(row: &PgRow) -> AppResult<TransactionDetails> {
    let transaction = Transaction::from_row(row)?;
    let book = match row.try_get::<Option<i64>, _>("summary_id")? {
        Some(id) => Some(BookSummary {
            id,
            title: row.try_get("summary_title")?,
            author: row.try_get("summary_author")?,
            thumbnail_url: row.try_get("summary_thumbnail_url")?,
        }),
        None => None,
    };
    Ok(TransactionDetails::new(transaction, book, Utc::now()))
}
