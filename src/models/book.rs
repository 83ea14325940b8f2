//! Book (catalog entry) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{BookStatus, BookType};
use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Row offset of a 0-based page; saturates instead of overflowing
pub fn page_offset(page: i64, limit: i64) -> i64 {
    page.max(0).saturating_mul(limit)
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub published_at: Option<NaiveDate>,
    pub book_type: BookType,
    pub status: BookStatus,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub price: Option<Decimal>,
    pub rental_price: Option<Decimal>,
    pub rental_duration_days: Option<i32>,
    pub publisher: Option<String>,
    pub thumbnail_url: Option<String>,
    pub page_count: Option<i32>,
    pub average_rating: f64,
    pub ratings_count: i32,
    pub language: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// A copy can be lent only while stock remains and the book is marked available
    pub fn is_borrowable(&self) -> bool {
        self.available_quantity > 0 && self.status == BookStatus::Available
    }

    pub fn ensure_borrowable(&self) -> AppResult<()> {
        if self.is_borrowable() {
            Ok(())
        } else {
            Err(AppError::Conflict("Book is not available for borrowing".to_string()))
        }
    }

    /// Take one copy out of stock
    pub fn take_copy(&mut self) {
        self.available_quantity -= 1;
        if self.available_quantity == 0 {
            self.status = BookStatus::OutOfStock;
        }
    }

    /// Put one copy back in stock
    pub fn return_copy(&mut self) {
        self.available_quantity += 1;
        if self.status == BookStatus::OutOfStock {
            self.status = BookStatus::Available;
        }
    }

    /// Price charged at checkout; a missing or non-positive price means free
    pub fn checkout_price(&self) -> Decimal {
        match self.price {
            Some(price) if price > Decimal::ZERO => price,
            _ => Decimal::ZERO,
        }
    }
}

/// Create book request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub published_at: Option<NaiveDate>,
    pub book_type: Option<BookType>,
    pub status: Option<BookStatus>,
    #[validate(range(min = 0))]
    pub total_quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub available_quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub rental_price: Option<Decimal>,
    #[validate(range(min = 1))]
    pub rental_duration_days: Option<i32>,
    pub publisher: Option<String>,
    pub thumbnail_url: Option<String>,
    #[validate(range(min = 0))]
    pub page_count: Option<i32>,
    pub language: Option<String>,
}

impl CreateBook {
    /// Prices cannot be expressed as validator ranges on `Decimal`
    pub fn validate_prices(&self) -> AppResult<()> {
        ensure_non_negative(self.price)?;
        ensure_non_negative(self.rental_price)
    }
}

/// Partial update request: absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub published_at: Option<NaiveDate>,
    pub book_type: Option<BookType>,
    pub status: Option<BookStatus>,
    #[validate(range(min = 0))]
    pub total_quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub available_quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub rental_price: Option<Decimal>,
    #[validate(range(min = 1))]
    pub rental_duration_days: Option<i32>,
    pub publisher: Option<String>,
    pub thumbnail_url: Option<String>,
    #[validate(range(min = 0))]
    pub page_count: Option<i32>,
    pub language: Option<String>,
}

impl UpdateBook {
    pub fn validate_prices(&self) -> AppResult<()> {
        ensure_non_negative(self.price)?;
        ensure_non_negative(self.rental_price)
    }
}

fn ensure_non_negative(value: Option<Decimal>) -> AppResult<()> {
    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => {
            Err(AppError::Validation("Price must not be negative".to_string()))
        }
        _ => Ok(()),
    }
}

/// Fully resolved book ready for insertion
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub published_at: Option<NaiveDate>,
    pub book_type: BookType,
    pub status: BookStatus,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub price: Option<Decimal>,
    pub rental_price: Option<Decimal>,
    pub rental_duration_days: Option<i32>,
    pub publisher: Option<String>,
    pub thumbnail_url: Option<String>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
    pub created_by: Option<String>,
}

impl NewBook {
    pub fn from_request(request: CreateBook, actor: Option<String>) -> Self {
        Self {
            title: request.title,
            author: request.author,
            isbn: request.isbn,
            description: request.description,
            categories: request.categories,
            published_at: request.published_at,
            book_type: request.book_type.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            total_quantity: request.total_quantity.unwrap_or(0),
            available_quantity: request.available_quantity.unwrap_or(0),
            price: request.price,
            rental_price: request.rental_price,
            rental_duration_days: request.rental_duration_days,
            publisher: request.publisher,
            thumbnail_url: request.thumbnail_url,
            page_count: request.page_count,
            language: request.language,
            created_by: actor,
        }
    }
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Page number, 0-based (default: 0)
    pub page: Option<i64>,
    /// Items per page (default: 10)
    pub limit: Option<i64>,
    /// Alias of `limit`
    pub size: Option<i64>,
    /// Free-text search in title, author and ISBN
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub status: Option<BookStatus>,
}

impl BookQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .or(self.size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn filters(&self) -> BookFilters {
        BookFilters {
            keyword: non_blank(&self.keyword),
            category: non_blank(&self.category),
            author: non_blank(&self.author),
            status: self.status,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Normalized search filters; their JSON form is part of the cache key
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
}

impl BookFilters {
    pub fn cache_key(&self, page: i64, limit: i64) -> String {
        let filters = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("books:page:{}:limit:{}:filters:{}", page, limit, filters)
    }
}

/// One page of search results as stored in the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListing {
    pub books: Vec<Book>,
    pub total: i64,
}

/// Paginated book list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPage {
    pub data: Vec<Book>,
    pub current_page: i64,
    pub total_pages: i64,
    pub page_size: i64,
    pub total_elements: i64,
}

impl BookPage {
    pub fn new(listing: BookListing, page: i64, limit: i64) -> Self {
        let total_pages = (listing.total + limit - 1) / limit;
        Self {
            data: listing.books,
            current_page: page,
            total_pages,
            page_size: limit,
            total_elements: listing.total,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_book(id: i64) -> Book {
    let now = Utc::now();
    Book {
        id,
        title: format!("Book {}", id),
        author: "Author".to_string(),
        isbn: None,
        description: None,
        categories: None,
        published_at: None,
        book_type: BookType::PhysicalBook,
        status: BookStatus::Available,
        total_quantity: 1,
        available_quantity: 1,
        price: None,
        rental_price: None,
        rental_duration_days: None,
        publisher: None,
        thumbnail_url: None,
        page_count: None,
        average_rating: 0.0,
        ratings_count: 0,
        language: None,
        created_by: None,
        updated_by: None,
        created_at: now,
        updated_at: now,
    }
}
