//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::TicketNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::EmailAlreadyRegistered
            | Self::TicketAlreadyAssigned
            | Self::TicketConflict => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::RoleNotFound | Self::RegistrationClosed => {
                StatusCode::FORBIDDEN
            }

            // 503 Service Unavailable (provider outage, client can retry)
            Self::IdentityProviderError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation errors)
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::PasswordTooShort
            | Self::UnknownOfficer => StatusCode::BAD_REQUEST,
        }
    }
}
