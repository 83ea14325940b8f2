//! Google Books volume search

use std::time::Duration;

use crate::{
    config::GoogleBooksConfig,
    error::{AppError, AppResult},
    models::google::{VolumeInfo, VolumesResponse},
};

#[derive(Clone)]
pub struct GoogleBooksService {
    client: reqwest::Client,
    config: GoogleBooksConfig,
}

impl GoogleBooksService {
    pub fn new(config: GoogleBooksConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Search volumes matching a free-text query
    pub async fn search(&self, query: &str) -> AppResult<Vec<VolumeInfo>> {
        let url = format!("{}/volumes", self.config.base_url.trim_end_matches('/'));
        let max_results = self.config.max_results.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("maxResults", max_results.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!("Google Books request failed: {}", e);
                AppError::Upstream("Failed to import books".to_string())
            })?;

        let body: VolumesResponse = response.json().await.map_err(|e| {
            tracing::warn!("Unexpected Google Books response: {}", e);
            AppError::Upstream("Failed to import books".to_string())
        })?;

        Ok(body.items.into_iter().map(|v| v.volume_info).collect())
    }
}
