//! BookX Bookstore and Library Service
//!
//! REST JSON API for a book catalog with reviews, borrowing, user
//! playlists and a checkout flow that grants purchased books.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
