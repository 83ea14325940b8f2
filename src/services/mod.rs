//! Business logic services

pub mod catalog;
pub mod google_books;
pub mod identity;
pub mod orders;
pub mod playlists;
pub mod redis;
pub mod reviews;
pub mod stats;
pub mod transactions;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub identity: identity::IdentityService,
    pub catalog: catalog::CatalogService,
    pub reviews: reviews::ReviewsService,
    pub transactions: transactions::TransactionsService,
    pub playlists: playlists::PlaylistsService,
    pub orders: orders::OrdersService,
    pub stats: stats::StatsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        redis_service: redis::RedisService,
    ) -> AppResult<Self> {
        let google_books = google_books::GoogleBooksService::new(config.google_books.clone())?;

        Ok(Self {
            identity: identity::IdentityService::new(&config.identity)?,
            catalog: catalog::CatalogService::new(
                repository.clone(),
                redis_service,
                google_books,
                config.redis.cache_ttl_seconds,
            ),
            reviews: reviews::ReviewsService::new(repository.clone()),
            transactions: transactions::TransactionsService::new(
                repository.clone(),
                config.borrowing.clone(),
            ),
            playlists: playlists::PlaylistsService::new(repository.clone()),
            orders: orders::OrdersService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        })
    }

    /// Check that the database answers
    pub async fn ready(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
