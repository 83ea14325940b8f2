//! Book review model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    pub user_id: String,
    pub user_name: Option<String>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn ensure_author(&self, user_id: &str) -> AppResult<()> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Not authorized to delete this review".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
    /// Display name shown next to the review
    #[validate(length(max = 255))]
    pub user_name: Option<String>,
}

/// Review list query parameters (1-based pages)
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ReviewQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(super::book::DEFAULT_PAGE_SIZE)
            .clamp(1, super::book::MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        super::book::page_offset(self.page() - 1, self.limit())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let review = |rating| CreateReview { rating, comment: None, user_name: None };
        assert!(review(0).validate().is_err());
        assert!(review(6).validate().is_err());
        assert!(review(1).validate().is_ok());
        assert!(review(5).validate().is_ok());
    }

    #[test]
    fn test_pages_are_one_based() {
        let query = ReviewQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.offset(), 0);

        let query = ReviewQuery { page: Some(3), limit: Some(5) };
        assert_eq!(query.offset(), 10);

        let query = ReviewQuery { page: Some(0), limit: None };
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let query = ReviewQuery { page: Some(i64::MAX), limit: Some(10) };
        assert_eq!(query.offset(), i64::MAX);
    }

    #[test]
    fn test_only_author_may_delete() {
        let now = Utc::now();
        let review = Review {
            id: 1,
            book_id: 1,
            user_id: "alice".into(),
            user_name: None,
            rating: 4,
            comment: None,
            created_at: now,
            updated_at: now,
        };
        assert!(review.ensure_author("alice").is_ok());
        assert!(matches!(review.ensure_author("bob"), Err(AppError::Authorization(_))));
    }
}
