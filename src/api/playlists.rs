//! Playlist endpoints
//!
//! Every route is also mounted under `/api/playlists/playlists` for older clients.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::Book,
        playlist::{
            parse_playlist_id, AddBookRequest, CreatePlaylist, Playlist, PlaylistBook,
            PlaylistDetails, PlaylistPage, PlaylistQuery,
        },
    },
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse, AuthenticatedUser};

/// Create a playlist
#[utoipa::path(
    post,
    path = "/api/playlists",
    tag = "playlists",
    security(("bearer_auth" = [])),
    request_body = CreatePlaylist,
    responses(
        (status = 201, description = "Playlist created", body = Playlist),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_playlist(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreatePlaylist>,
) -> AppResult<(StatusCode, Json<ApiResponse<Playlist>>)> {
    request.validate()?;

    let playlist = state.services.playlists.create(&claims.user_id, &request).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(playlist)))
}

/// Add a book given in the body
#[utoipa::path(
    post,
    path = "/api/playlists/{id}/books",
    tag = "playlists",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Playlist ID")
    ),
    request_body = AddBookRequest,
    responses(
        (status = 201, description = "Book added", body = PlaylistBook),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist or book not found"),
        (status = 409, description = "Book already in playlist")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<AddBookRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PlaylistBook>>)> {
    let playlist_id = parse_playlist_id(&id)?;
    request.validate()?;

    let entry = state
        .services
        .playlists
        .add_book(&claims.user_id, playlist_id, request.book_id)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(entry)))
}

/// Add a book given in the path
#[utoipa::path(
    post,
    path = "/api/playlists/{id}/books/{book_id}",
    tag = "playlists",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Playlist ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book added", body = PlaylistBook),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist or book not found"),
        (status = 409, description = "Book already in playlist")
    )
)]
pub async fn add_book_by_path(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath((id, book_id)): ApiPath<(String, i64)>,
) -> AppResult<(StatusCode, Json<ApiResponse<PlaylistBook>>)> {
    let playlist_id = parse_playlist_id(&id)?;

    let entry = state
        .services
        .playlists
        .add_book(&claims.user_id, playlist_id, book_id)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(entry)))
}

/// Remove a book from a playlist
#[utoipa::path(
    delete,
    path = "/api/playlists/{id}/books/{book_id}",
    tag = "playlists",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Playlist ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book removed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist not found or book not in playlist")
    )
)]
pub async fn remove_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath((id, book_id)): ApiPath<(String, i64)>,
) -> AppResult<StatusCode> {
    let playlist_id = parse_playlist_id(&id)?;

    state
        .services
        .playlists
        .remove_book(&claims.user_id, playlist_id, book_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Playlists of the caller
#[utoipa::path(
    get,
    path = "/api/playlists/my",
    tag = "playlists",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Playlists, newest first", body = Vec<Playlist>)
    )
)]
pub async fn my_playlists(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Playlist>>>> {
    let playlists = state.services.playlists.my_playlists(&claims.user_id).await?;
    Ok(ApiResponse::ok(playlists))
}

/// Books the caller has borrowed
#[utoipa::path(
    get,
    path = "/api/playlists/my-books",
    tag = "playlists",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Distinct borrowed books", body = Vec<Book>)
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Book>>>> {
    let books = state.services.catalog.borrowed_books(&claims.user_id).await?;
    Ok(ApiResponse::ok(books))
}

/// Public playlists
#[utoipa::path(
    get,
    path = "/api/playlists/public",
    tag = "playlists",
    params(PlaylistQuery),
    responses(
        (status = 200, description = "Public playlists, newest first", body = PlaylistPage)
    )
)]
pub async fn public_playlists(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<PlaylistQuery>,
) -> AppResult<Json<ApiResponse<PlaylistPage>>> {
    let page = state.services.playlists.public(&query).await?;
    Ok(ApiResponse::ok(page))
}

/// Playlist with its books
#[utoipa::path(
    get,
    path = "/api/playlists/{id}",
    tag = "playlists",
    params(
        ("id" = i64, Path, description = "Playlist ID")
    ),
    responses(
        (status = 200, description = "Playlist details", body = PlaylistDetails),
        (status = 400, description = "Invalid Playlist ID"),
        (status = 404, description = "Playlist not found")
    )
)]
pub async fn get_playlist(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<ApiResponse<PlaylistDetails>>> {
    let playlist_id = parse_playlist_id(&id)?;

    let playlist = state.services.playlists.get(playlist_id).await?;
    Ok(ApiResponse::ok(playlist))
}
