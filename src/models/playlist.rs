//! Playlist (user book collection) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::Book;
use crate::error::{AppError, AppResult};

/// Playlist that collects purchased and free books
pub const MY_PURCHASES: &str = "My Purchases";
pub const MY_PURCHASES_DESCRIPTION: &str = "Books I have purchased";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn ensure_owner(&self, user_id: &str) -> AppResult<()> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(AppError::Authorization("Unauthorized".to_string()))
        }
    }
}

/// Membership row linking a book to a playlist
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistBook {
    pub id: i64,
    pub playlist_id: i64,
    pub book_id: i64,
    pub position: i32,
    pub added_at: DateTime<Utc>,
}

/// Membership entry with the book it points to
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub id: i64,
    pub book_id: i64,
    pub position: i32,
    pub added_at: DateTime<Utc>,
    pub book: Book,
}

/// Playlist with its books ordered by position
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetails {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub playlist_books: Vec<PlaylistEntry>,
}

impl PlaylistDetails {
    pub fn new(playlist: Playlist, playlist_books: Vec<PlaylistEntry>) -> Self {
        Self {
            id: playlist.id,
            user_id: playlist.user_id,
            name: playlist.name,
            description: playlist.description,
            is_public: playlist.is_public,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
            playlist_books,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylist {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Body form of "add book", used when the book id is not in the path
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddBookRequest {
    #[validate(range(min = 1, message = "bookId must be a positive integer"))]
    pub book_id: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlaylistQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PlaylistQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(super::book::DEFAULT_PAGE_SIZE)
            .clamp(1, super::book::MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        super::book::page_offset(self.page.unwrap_or(1).max(1) - 1, self.limit())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistPage {
    pub playlists: Vec<Playlist>,
    pub total: i64,
}

/// Parse a playlist id taken from the path
pub fn parse_playlist_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest("Invalid Playlist ID".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_playlist_id() {
        assert_eq!(parse_playlist_id("42").unwrap(), 42);
        assert!(matches!(parse_playlist_id("abc"), Err(AppError::BadRequest(_))));
        assert!(parse_playlist_id("-1").is_err());
    }

    #[test]
    fn test_ensure_owner() {
        let now = Utc::now();
        let playlist = Playlist {
            id: 1,
            user_id: "alice".into(),
            name: MY_PURCHASES.into(),
            description: Some(MY_PURCHASES_DESCRIPTION.into()),
            is_public: false,
            created_at: now,
            updated_at: now,
        };
        assert!(playlist.ensure_owner("alice").is_ok());
        assert!(matches!(playlist.ensure_owner("bob"), Err(AppError::Authorization(_))));
    }

    #[test]
    fn test_create_playlist_defaults_private() {
        let request: CreatePlaylist = serde_json::from_str(r#"{"name":"Favourites"}"#).unwrap();
        assert!(!request.is_public);
        assert!(request.validate().is_ok());

        let empty: CreatePlaylist = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_public_page_offset() {
        let query = PlaylistQuery { page: Some(2), limit: Some(10) };
        assert_eq!(query.offset(), 10);
        assert_eq!(PlaylistQuery::default().offset(), 0);

        let query = PlaylistQuery { page: Some(i64::MAX), limit: Some(100) };
        assert_eq!(query.offset(), i64::MAX);
    }
}
