//! Reviews repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::review::{CreateReview, Review},
};

use super::books::refresh_rating;

const DUPLICATE_REVIEW: &str = "User has already reviewed this book";

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Review> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }

    /// Newest reviews of a book, with the total count
    pub async fn list_by_book(&self, book_id: i64, limit: i64, offset: i64) -> AppResult<(Vec<Review>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE book_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((reviews, total))
    }

    /// Insert a review and refresh the book's rating in one transaction
    pub async fn create(&self, book_id: i64, user_id: &str, review: &CreateReview) -> AppResult<Review> {
        let mut tx = self.pool.begin().await?;

        // Locking the book serializes rating updates
        let book_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?;
        if book_exists.is_none() {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        let already_reviewed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE book_id = $1 AND user_id = $2)",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_reviewed {
            return Err(AppError::Conflict(DUPLICATE_REVIEW.to_string()));
        }

        let created = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (book_id, user_id, user_name, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(&review.user_name)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_REVIEW))?;

        refresh_rating(&mut *tx, book_id).await?;
        tx.commit().await?;

        Ok(created)
    }

    /// Delete a review and refresh the book's rating in one transaction
    pub async fn delete(&self, review: &Review) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(review.book_id)
            .fetch_optional(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Review not found".to_string()));
        }

        refresh_rating(&mut *tx, review.book_id).await?;
        tx.commit().await?;

        Ok(())
    }
}
