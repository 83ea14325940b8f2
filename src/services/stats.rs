//! Statistics service

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, repository::Repository};

/// Dashboard counters
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_books: i64,
    /// Always 0: user records live in the identity service
    pub total_users: i64,
    pub total_borrows: i64,
    pub active_borrows: i64,
    pub revenue: Decimal,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn summary(&self) -> AppResult<StatsSummary> {
        let (total_books, total_borrows, active_borrows, revenue) = tokio::try_join!(
            self.repository.books.count(),
            self.repository.transactions.count_all(),
            self.repository.transactions.count_active(),
            self.repository.orders.revenue(),
        )?;

        Ok(StatsSummary {
            total_books,
            total_users: 0,
            total_borrows,
            active_borrows,
            revenue,
        })
    }
}
