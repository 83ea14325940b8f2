//! Playlist service

use crate::{
    error::AppResult,
    models::playlist::{CreatePlaylist, Playlist, PlaylistBook, PlaylistDetails, PlaylistPage, PlaylistQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct PlaylistsService {
    repository: Repository,
}

impl PlaylistsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, user_id: &str, request: &CreatePlaylist) -> AppResult<Playlist> {
        self.repository.playlists.create(user_id, request).await
    }

    /// Append a book to a playlist owned by the caller
    pub async fn add_book(&self, user_id: &str, playlist_id: i64, book_id: i64) -> AppResult<PlaylistBook> {
        let playlist = self.repository.playlists.get_by_id(playlist_id).await?;
        playlist.ensure_owner(user_id)?;
        self.repository.books.get_by_id(book_id).await?;
        self.repository.playlists.add_book(playlist_id, book_id).await
    }

    pub async fn remove_book(&self, user_id: &str, playlist_id: i64, book_id: i64) -> AppResult<()> {
        let playlist = self.repository.playlists.get_by_id(playlist_id).await?;
        playlist.ensure_owner(user_id)?;
        self.repository.playlists.remove_book(playlist_id, book_id).await
    }

    pub async fn my_playlists(&self, user_id: &str) -> AppResult<Vec<Playlist>> {
        self.repository.playlists.list_by_user(user_id).await
    }

    /// Playlist with its books ordered by position
    pub async fn get(&self, playlist_id: i64) -> AppResult<PlaylistDetails> {
        let playlist = self.repository.playlists.get_by_id(playlist_id).await?;
        let entries = self.repository.playlists.entries(playlist_id).await?;
        Ok(PlaylistDetails::new(playlist, entries))
    }

    pub async fn public(&self, query: &PlaylistQuery) -> AppResult<PlaylistPage> {
        let (playlists, total) = self
            .repository
            .playlists
            .list_public(query.limit(), query.offset())
            .await?;
        Ok(PlaylistPage { playlists, total })
    }
}
