//! Ticket form catalogues (public)

use axum::{Router, extract::State, routing::get};
use shared::models::Catalog;

use crate::core::ServerState;
use crate::utils::ApiResponse;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/catalog", get(catalog))
}

/// GET /api/catalog - 地点、部门、问题类型与可分配人员
pub async fn catalog(State(state): State<ServerState>) -> ApiResponse<Catalog> {
    ApiResponse::success(state.catalog())
}
