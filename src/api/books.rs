//! Book catalog endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookPage, BookQuery, CreateBook, UpdateBook},
        user::Principal,
    },
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse, AuthenticatedUser};

/// Google Books import query
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GoogleImportQuery {
    /// Free-text Google Books query
    pub q: Option<String>,
}

/// List books with optional filters
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Page of books, newest first", body = BookPage),
        (status = 400, description = "Invalid query parameters")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<BookQuery>,
) -> AppResult<Json<ApiResponse<BookPage>>> {
    let page = state.services.catalog.list_books(&query).await?;
    Ok(ApiResponse::ok(page))
}

/// Distinct categories used in the catalog
#[utoipa::path(
    get,
    path = "/api/books/categories",
    tag = "books",
    responses(
        (status = 200, description = "Sorted category names", body = Vec<String>)
    )
)]
pub async fn get_categories(
    State(state): State<crate::AppState>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let categories = state.services.catalog.categories().await?;
    Ok(ApiResponse::ok(categories))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(ApiResponse::ok(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateBook>,
) -> AppResult<(StatusCode, Json<ApiResponse<Book>>)> {
    request.validate()?;
    request.validate_prices()?;

    let book = state
        .services
        .catalog
        .create_book(request, Some(claims.user_id))
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(book)))
}

/// Update a book; omitted fields keep their value
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateBook>,
) -> AppResult<Json<ApiResponse<Book>>> {
    request.validate()?;
    request.validate_prices()?;

    let book = state
        .services
        .catalog
        .update_book(id, &request, &claims.user_id)
        .await?;
    Ok(ApiResponse::ok(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Import books from Google Books
#[utoipa::path(
    post,
    path = "/api/books/search/google",
    tag = "books",
    params(GoogleImportQuery),
    responses(
        (status = 201, description = "Imported books", body = Vec<Book>),
        (status = 400, description = "Missing query"),
        (status = 502, description = "Google Books unavailable")
    )
)]
pub async fn import_from_google(
    State(state): State<crate::AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<GoogleImportQuery>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<Book>>>)> {
    let books = state
        .services
        .catalog
        .import_from_google(query.q.as_deref().unwrap_or_default(), &principal)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(books)))
}
