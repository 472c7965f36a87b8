//! Permission Definitions
//!
//! One table keyed by `(Role, Operation)`. Anything not listed is denied.
//! Checked once, at the ticket service boundary.

use shared::models::Role;

use crate::auth::Session;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// Operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateTicket,
    ListTickets,
    ViewTicket,
    ViewDashboard,
    AssignTicket,
    ResolveTicket,
    DeleteTicket,
}

impl Operation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateTicket => "tickets:create",
            Operation::ListTickets => "tickets:list",
            Operation::ViewTicket => "tickets:view",
            Operation::ViewDashboard => "dashboard:view",
            Operation::AssignTicket => "tickets:assign",
            Operation::ResolveTicket => "tickets:resolve",
            Operation::DeleteTicket => "tickets:delete",
        }
    }
}

/// Allowed `(role, operation)` pairs
pub const PERMISSION_TABLE: &[(Role, Operation)] = &[
    // Everyone signed in
    (Role::User, Operation::CreateTicket),
    (Role::User, Operation::ListTickets),
    (Role::User, Operation::ViewTicket),
    (Role::User, Operation::ViewDashboard),
    (Role::Ict, Operation::CreateTicket),
    (Role::Ict, Operation::ListTickets),
    (Role::Ict, Operation::ViewTicket),
    (Role::Ict, Operation::ViewDashboard),
    // ICT staff only
    (Role::Ict, Operation::AssignTicket),
    (Role::Ict, Operation::ResolveTicket),
    (Role::Ict, Operation::DeleteTicket),
];

pub fn is_allowed(role: Role, operation: Operation) -> bool {
    PERMISSION_TABLE.contains(&(role, operation))
}

/// Fail with `PermissionDenied` unless the session's role may perform `operation`
pub fn authorize(session: &Session, operation: Operation) -> AppResult<()> {
    if is_allowed(session.role, operation) {
        return Ok(());
    }

    security_log!(
        "WARN",
        "permission_denied",
        identity_id = session.identity_id.as_str(),
        role = session.role.as_str(),
        operation = operation.as_str()
    );
    Err(AppError::permission_denied(format!(
        "Role '{}' may not perform {}",
        session.role,
        operation.as_str()
    ))
    .with_detail("operation", operation.as_str()))
}
