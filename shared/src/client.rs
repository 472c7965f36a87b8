//! Auth request/response types shared between server and client

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Role;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Login request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Authenticated user as seen by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Lower-cased, trimmed e-mail used as the account key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
