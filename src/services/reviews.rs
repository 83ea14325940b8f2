//! Review service

use crate::{
    error::AppResult,
    models::review::{CreateReview, Review, ReviewPage, ReviewQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add the user's review of a book and refresh its rating
    pub async fn add_review(&self, book_id: i64, user_id: &str, review: &CreateReview) -> AppResult<Review> {
        let created = self.repository.reviews.create(book_id, user_id, review).await?;
        tracing::info!("User {} reviewed book {} ({}/5)", user_id, book_id, created.rating);
        Ok(created)
    }

    pub async fn list_reviews(&self, book_id: i64, query: &ReviewQuery) -> AppResult<ReviewPage> {
        let (reviews, total) = self
            .repository
            .reviews
            .list_by_book(book_id, query.limit(), query.offset())
            .await?;
        Ok(ReviewPage { reviews, total })
    }

    /// Delete a review written by the caller and refresh the book's rating
    pub async fn delete_review(&self, review_id: i64, user_id: &str) -> AppResult<()> {
        let review = self.repository.reviews.get_by_id(review_id).await?;
        review.ensure_author(user_id)?;
        self.repository.reviews.delete(&review).await
    }
}
