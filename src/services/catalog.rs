//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookListing, BookPage, BookQuery, CreateBook, NewBook, UpdateBook},
        user::Principal,
    },
    repository::Repository,
    services::{google_books::GoogleBooksService, redis::RedisService},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    redis: RedisService,
    google_books: GoogleBooksService,
    cache_ttl_seconds: u64,
}

impl CatalogService {
    pub fn new(
        repository: Repository,
        redis: RedisService,
        google_books: GoogleBooksService,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            repository,
            redis,
            google_books,
            cache_ttl_seconds,
        }
    }

    /// Search books, serving repeated queries from the cache
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<BookPage> {
        let page = query.page();
        let limit = query.limit();
        let filters = query.filters();
        let key = filters.cache_key(page, limit);

        match self.redis.get_json::<BookListing>(&key).await {
            Ok(Some(listing)) => {
                tracing::debug!("Cache hit for {}", key);
                return Ok(BookPage::new(listing, page, limit));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
        }

        let listing = self.repository.books.search(&filters, page, limit).await?;

        if let Err(e) = self.redis.set_json(&key, &listing, self.cache_ttl_seconds).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }

        Ok(BookPage::new(listing, page, limit))
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, request: CreateBook, actor: Option<String>) -> AppResult<Book> {
        let book = self
            .repository
            .books
            .create(&NewBook::from_request(request, actor))
            .await?;
        tracing::info!("Book {} created: {}", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: i64, update: &UpdateBook, actor: &str) -> AppResult<Book> {
        self.repository.books.update(id, update, Some(actor)).await
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        if !self.repository.books.delete(id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        tracing::info!("Book {} deleted", id);
        Ok(())
    }

    pub async fn categories(&self) -> AppResult<Vec<String>> {
        self.repository.books.categories().await
    }

    /// Import the volumes Google Books returns for a query as new books
    pub async fn import_from_google(&self, query: &str, principal: &Principal) -> AppResult<Vec<Book>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("Query 'q' is required".to_string()));
        }

        let volumes = self.google_books.search(query).await?;
        let books: Vec<NewBook> = volumes
            .into_iter()
            .map(|volume| volume.into_new_book(principal.actor()))
            .collect();

        let created = self.repository.books.create_many(&books).await?;
        tracing::info!("Imported {} books from Google Books for '{}'", created.len(), query);
        Ok(created)
    }

    /// Distinct books from the user's borrow history
    pub async fn borrowed_books(&self, user_id: &str) -> AppResult<Vec<Book>> {
        self.repository.books.borrowed_by(user_id).await
    }

    pub async fn count_books(&self) -> AppResult<i64> {
        self.repository.books.count().await
    }
}
