//! Token validation against the external identity service

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    config::IdentityConfig,
    error::{AppError, AppResult},
    models::user::UserClaims,
};

#[derive(Serialize)]
struct IntrospectRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct IntrospectResponse {
    result: Option<IntrospectResult>,
}

#[derive(Deserialize)]
struct IntrospectResult {
    #[serde(default)]
    valid: bool,
}

#[derive(Clone)]
pub struct IdentityService {
    client: reqwest::Client,
    introspect_url: String,
}

impl IdentityService {
    pub fn new(config: &IdentityConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            introspect_url: format!("{}/auth/introspect", config.base_url.trim_end_matches('/')),
        })
    }

    /// Ask the identity service whether a token is valid
    pub async fn introspect(&self, token: &str) -> AppResult<bool> {
        let response = self
            .client
            .post(&self.introspect_url)
            .json(&IntrospectRequest { token })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Identity service unreachable: {}", e);
                AppError::Authentication("Identity service unreachable".to_string())
            })?;

        if !response.status().is_success() {
            tracing::debug!("Introspection rejected with status {}", response.status());
            return Ok(false);
        }

        let body: IntrospectResponse = response.json().await.map_err(|e| {
            tracing::warn!("Unexpected introspection response: {}", e);
            AppError::Authentication("Invalid introspection response".to_string())
        })?;

        Ok(body.result.map(|r| r.valid).unwrap_or(false))
    }

    /// Validate a bearer token and read its claims
    pub async fn authenticate(&self, token: &str) -> AppResult<UserClaims> {
        if !self.introspect(token).await? {
            return Err(AppError::Authentication("Invalid token".to_string()));
        }
        UserClaims::from_token(token)
    }
}
