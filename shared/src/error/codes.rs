//! Unified error codes for the helpdesk
//!
//! Every failure the service reports carries one of these codes. Codes are
//! grouped by range:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Ticket errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as its `u16` value so web clients can switch on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Body or query string could not be decoded
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Invalid e-mail or password
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid or revoked
    TokenInvalid = 1004,
    /// E-mail already has an account
    EmailAlreadyRegistered = 1005,
    /// Password below minimum length
    PasswordTooShort = 1006,
    /// Self-registration for the requested role is disabled
    RegistrationClosed = 1007,

    // ==================== 2xxx: Permission ====================
    /// Role does not allow the operation
    PermissionDenied = 2001,
    /// Identity has no profile / role
    RoleNotFound = 2002,

    // ==================== 4xxx: Ticket ====================
    /// Ticket not found
    TicketNotFound = 4001,
    /// Ticket already has an officer
    TicketAlreadyAssigned = 4002,
    /// Ticket changed underneath a conditional update
    TicketConflict = 4003,
    /// Officer is not on the roster
    UnknownOfficer = 4004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Document store failure
    DatabaseError = 9002,
    /// Identity provider failure
    IdentityProviderError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::PasswordTooShort => "Password is too short",
            ErrorCode::RegistrationClosed => "Registration for this role is closed",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleNotFound => "User role not found",

            // Ticket
            ErrorCode::TicketNotFound => "Ticket not found",
            ErrorCode::TicketAlreadyAssigned => "Ticket is already assigned",
            ErrorCode::TicketConflict => "Ticket was modified by another session",
            ErrorCode::UnknownOfficer => "Officer is not on the roster",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::IdentityProviderError => "Identity provider error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            5 => ErrorCode::InvalidRequest,
            7 => ErrorCode::RequiredField,

            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidCredentials,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,
            1005 => ErrorCode::EmailAlreadyRegistered,
            1006 => ErrorCode::PasswordTooShort,
            1007 => ErrorCode::RegistrationClosed,

            2001 => ErrorCode::PermissionDenied,
            2002 => ErrorCode::RoleNotFound,

            4001 => ErrorCode::TicketNotFound,
            4002 => ErrorCode::TicketAlreadyAssigned,
            4003 => ErrorCode::TicketConflict,
            4004 => ErrorCode::UnknownOfficer,

            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9004 => ErrorCode::IdentityProviderError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);

        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::EmailAlreadyRegistered.code(), 1005);

        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::RoleNotFound.code(), 2002);

        assert_eq!(ErrorCode::TicketNotFound.code(), 4001);
        assert_eq!(ErrorCode::TicketAlreadyAssigned.code(), 4002);
        assert_eq!(ErrorCode::TicketConflict.code(), 4003);

        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::TicketNotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(2002), Ok(ErrorCode::RoleNotFound));
        assert_eq!(
            ErrorCode::try_from(4002),
            Ok(ErrorCode::TicketAlreadyAssigned)
        );
        assert_eq!(ErrorCode::try_from(9004), Ok(ErrorCode::IdentityProviderError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(ErrorCode::try_from(4005), Err(InvalidErrorCode(4005)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::TicketAlreadyAssigned).unwrap();
        assert_eq!(json, "4002");
        let code: ErrorCode = serde_json::from_str("2001").unwrap();
        assert_eq!(code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("12345");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::TicketConflict.to_string(), "4003");
    }
}
