//! Authentication Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

use crate::auth::{BearerToken, Session};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// POST /api/auth/register
pub async fn register(
    State(state): State<ServerState>,
    req: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<ApiResponse<UserInfo>> {
    let Json(req) = req?;
    let user = state.accounts.register(req).await?;
    Ok(ApiResponse::success_with_message("Registered", user))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    req: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let Json(req) = req?;
    let response = state.accounts.login(req).await?;
    Ok(ApiResponse::success(response))
}

/// GET /api/auth/me
pub async fn me(session: Session) -> ApiResponse<UserInfo> {
    ApiResponse::success(session.user_info())
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<ServerState>,
    session: Session,
    BearerToken(token): BearerToken,
) -> AppResult<ApiResponse<()>> {
    state.accounts.logout(&token).await?;
    tracing::info!(identity_id = %session.identity_id, "User logged out");
    Ok(ApiResponse::ok())
}
