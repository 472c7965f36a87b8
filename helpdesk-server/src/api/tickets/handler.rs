//! Ticket API Handlers

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use shared::models::{AssignRequest, ListQuery, Ticket, TicketCreate};

use crate::auth::Session;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// GET /api/tickets?order=created_desc - 获取所有工单
pub async fn list(
    State(state): State<ServerState>,
    session: Session,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<Ticket>>> {
    let Query(query) = query?;
    let tickets = state.tickets.list_tickets(&session, query.order).await?;
    Ok(ApiResponse::success(tickets))
}

/// GET /api/tickets/history - 已解决的工单
pub async fn history(
    State(state): State<ServerState>,
    session: Session,
) -> AppResult<ApiResponse<Vec<Ticket>>> {
    let tickets = state.tickets.ticket_history(&session).await?;
    Ok(ApiResponse::success(tickets))
}

/// GET /api/tickets/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Ticket>> {
    let ticket = state.tickets.get_ticket(&session, &id).await?;
    Ok(ApiResponse::success(ticket))
}

/// POST /api/tickets - 提交工单
pub async fn create(
    State(state): State<ServerState>,
    session: Session,
    payload: Result<Json<TicketCreate>, JsonRejection>,
) -> AppResult<ApiResponse<Ticket>> {
    let Json(payload) = payload?;
    let ticket = state.tickets.create_ticket(&session, payload).await?;
    Ok(ApiResponse::success_with_message("Ticket submitted", ticket))
}

/// PUT /api/tickets/{id}/assign - 分配给 ICT 人员
pub async fn assign(
    State(state): State<ServerState>,
    session: Session,
    Path(id): Path<String>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> AppResult<ApiResponse<Ticket>> {
    let Json(payload) = payload?;
    let ticket = state
        .tickets
        .assign_ticket(&session, &id, &payload.officer)
        .await?;
    Ok(ApiResponse::success(ticket))
}

/// PUT /api/tickets/{id}/resolve
pub async fn resolve(
    State(state): State<ServerState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Ticket>> {
    let ticket = state.tickets.resolve_ticket(&session, &id).await?;
    Ok(ApiResponse::success(ticket))
}

/// DELETE /api/tickets/{id}
pub async fn delete(
    State(state): State<ServerState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.tickets.delete_ticket(&session, &id).await?;
    Ok(ApiResponse::ok())
}
