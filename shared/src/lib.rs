//! Shared types for the ICT helpdesk
//!
//! Models, form catalogues, auth DTOs, error codes and the API response
//! envelope used by the server and its clients.

pub mod client;
pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
