//! Playlists repository for database operations

use sqlx::{FromRow, PgConnection, Pool, Postgres, Row};

use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::{
        book::Book,
        playlist::{
            CreatePlaylist, Playlist, PlaylistBook, PlaylistEntry, MY_PURCHASES,
            MY_PURCHASES_DESCRIPTION,
        },
    },
};

const ALREADY_IN_PLAYLIST: &str = "Book already in playlist";

#[derive(Clone)]
pub struct PlaylistsRepository {
    pool: Pool<Postgres>,
}

impl PlaylistsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Playlist> {
        sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))
    }

    pub async fn create(&self, user_id: &str, playlist: &CreatePlaylist) -> AppResult<Playlist> {
        let created = sqlx::query_as::<_, Playlist>(
            r#"
            INSERT INTO playlists (user_id, name, description, is_public)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Playlists owned by a user, newest first
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(
            "SELECT * FROM playlists WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    /// Public playlists, newest first, with the total count
    pub async fn list_public(&self, limit: i64, offset: i64) -> AppResult<(Vec<Playlist>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlists WHERE is_public")
            .fetch_one(&self.pool)
            .await?;

        let playlists = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT * FROM playlists
            WHERE is_public
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((playlists, total))
    }

    /// Books of a playlist ordered by position
    pub async fn entries(&self, playlist_id: i64) -> AppResult<Vec<PlaylistEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT pb.id AS entry_id, pb.position, pb.added_at, b.*
            FROM playlist_books pb
            JOIN books b ON b.id = pb.book_id
            WHERE pb.playlist_id = $1
            ORDER BY pb.position, pb.id
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let book = Book::from_row(&row)?;
            entries.push(PlaylistEntry {
                id: row.try_get("entry_id")?,
                book_id: book.id,
                position: row.try_get("position")?,
                added_at: row.try_get("added_at")?,
                book,
            });
        }

        Ok(entries)
    }

    /// Append a book at the end of the playlist
    pub async fn add_book(&self, playlist_id: i64, book_id: i64) -> AppResult<PlaylistBook> {
        let mut tx = self.pool.begin().await?;

        // Lock the playlist so concurrent appends compute distinct positions
        sqlx::query("SELECT id FROM playlists WHERE id = $1 FOR UPDATE")
            .bind(playlist_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))?;

        let already_present: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM playlist_books WHERE playlist_id = $1 AND book_id = $2)",
        )
        .bind(playlist_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_present {
            return Err(AppError::Conflict(ALREADY_IN_PLAYLIST.to_string()));
        }

        let entry = sqlx::query_as::<_, PlaylistBook>(
            r#"
            INSERT INTO playlist_books (playlist_id, book_id, position)
            VALUES ($1, $2, (SELECT COUNT(*) FROM playlist_books WHERE playlist_id = $1)::int + 1)
            RETURNING *
            "#,
        )
        .bind(playlist_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, ALREADY_IN_PLAYLIST))?;

        sqlx::query("UPDATE playlists SET updated_at = NOW() WHERE id = $1")
            .bind(playlist_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(entry)
    }

    /// Remove a book; positions of the remaining books are left as they are
    pub async fn remove_book(&self, playlist_id: i64, book_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM playlist_books WHERE playlist_id = $1 AND book_id = $2")
            .bind(playlist_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found in playlist".to_string()));
        }

        Ok(())
    }
}

/// Add books to the user's "My Purchases" playlist, creating it when needed.
/// Books already present are left alone, so granting twice is harmless.
pub async fn grant_books(conn: &mut PgConnection, user_id: &str, book_ids: &[i64]) -> AppResult<Playlist> {
    // Serialises find-or-create per user until the transaction ends
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    let existing = sqlx::query_as::<_, Playlist>(
        "SELECT * FROM playlists WHERE user_id = $1 AND name = $2 ORDER BY id LIMIT 1",
    )
    .bind(user_id)
    .bind(MY_PURCHASES)
    .fetch_optional(&mut *conn)
    .await?;

    let playlist = match existing {
        Some(playlist) => playlist,
        None => {
            sqlx::query_as::<_, Playlist>(
                r#"
                INSERT INTO playlists (user_id, name, description, is_public)
                VALUES ($1, $2, $3, FALSE)
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(MY_PURCHASES)
            .bind(MY_PURCHASES_DESCRIPTION)
            .fetch_one(&mut *conn)
            .await?
        }
    };

    // Same lock as add_book, so positions stay distinct
    sqlx::query("SELECT id FROM playlists WHERE id = $1 FOR UPDATE")
        .bind(playlist.id)
        .execute(&mut *conn)
        .await?;

    for book_id in book_ids {
        let result = sqlx::query(
            r#"
            INSERT INTO playlist_books (playlist_id, book_id, position)
            SELECT $1, b.id, (SELECT COUNT(*) FROM playlist_books WHERE playlist_id = $1)::int + 1
            FROM books b
            WHERE b.id = $2
            ON CONFLICT (playlist_id, book_id) DO NOTHING
            "#,
        )
        .bind(playlist.id)
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(book_id)
                .fetch_one(&mut *conn)
                .await?;
            if exists {
                tracing::debug!("Book {} already in playlist {}", book_id, playlist.id);
            } else {
                tracing::warn!("Skipping grant of deleted book {} to user {}", book_id, user_id);
            }
        }
    }

    Ok(playlist)
}
