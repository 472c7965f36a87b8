//! Dashboard Handlers

use axum::extract::State;
use shared::models::DashboardSummary;

use crate::auth::Session;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// GET /api/dashboard - 工单总数、按状态统计、近 7 天及按月统计
///
/// Months are bucketed in the configured business time zone.
pub async fn summary(
    State(state): State<ServerState>,
    session: Session,
) -> AppResult<ApiResponse<DashboardSummary>> {
    let tz = state.config.business_timezone;
    let summary = state.tickets.dashboard(&session, &tz).await?;
    Ok(ApiResponse::success(summary))
}
