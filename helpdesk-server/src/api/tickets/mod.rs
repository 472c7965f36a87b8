//! Ticket API 模块
//!
//! Permission checks live in [`TicketService`](crate::services::TicketService);
//! the routes only require a valid session.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tickets", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/history", get(handler::history))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/assign", put(handler::assign))
        .route("/{id}/resolve", put(handler::resolve))
}
