//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::StatsSummary};

use super::{ApiResponse, AuthenticatedUser};

/// Dashboard counters (admin)
#[utoipa::path(
    get,
    path = "/api/statistics/summary",
    tag = "statistics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Summary counters", body = StatsSummary),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn get_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<StatsSummary>>> {
    claims.require_admin()?;

    let summary = state.services.stats.summary().await?;
    Ok(ApiResponse::ok(summary))
}
