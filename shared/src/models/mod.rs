//! Data models
//!
//! Shared between helpdesk-server and its web client (via API).
//! Store documents are schemaless JSON; these types are the typed views.

pub mod catalog;
pub mod dashboard;
pub mod role;
pub mod ticket;

// Re-exports
pub use catalog::Catalog;
pub use dashboard::*;
pub use role::*;
pub use ticket::{AssignRequest, ListQuery, Ticket, TicketCreate, TicketOrder, TicketStatus};
