//! Identity Provider
//!
//! Authentication is consumed through the [`IdentityProvider`] trait. The
//! bundled [`LocalIdentityProvider`] keeps argon2 credentials in the document
//! store and issues JWT session tokens.

pub mod local;
pub mod revocation;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::JwtError;
use crate::store::StoreError;
use crate::utils::{AppError, ErrorCode};

pub use local::LocalIdentityProvider;
pub use revocation::RevocationList;

/// Authenticated principal behind a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub identity_id: String,
    pub email: String,
    pub display_name: String,
}

/// Result of a successful sign-in
#[derive(Debug, Clone)]
pub struct SignIn {
    pub identity_id: String,
    pub token: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email {0} is already registered")]
    EmailTaken(String),

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider failure: {0}")]
    Provider(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::ExpiredToken => AuthError::TokenExpired,
            JwtError::InvalidToken(_) | JwtError::InvalidSignature => {
                AuthError::InvalidToken(err.to_string())
            }
            JwtError::GenerationFailed(_)
            | JwtError::KeyGenerationFailed(_)
            | JwtError::ConfigError(_) => AuthError::Provider(err.to_string()),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Provider(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::InvalidCredentials => AppError::invalid_credentials(),
            AuthError::EmailTaken(email) => {
                AppError::with_message(ErrorCode::EmailAlreadyRegistered, err.to_string())
                    .with_detail("email", email.as_str())
            }
            AuthError::WeakPassword(_) => {
                AppError::with_message(ErrorCode::PasswordTooShort, err.to_string())
            }
            AuthError::TokenExpired => AppError::token_expired(),
            AuthError::TokenRevoked | AuthError::InvalidToken(_) => {
                AppError::invalid_token(err.to_string())
            }
            AuthError::Provider(_) => {
                AppError::with_message(ErrorCode::IdentityProviderError, err.to_string())
            }
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate a credential pair and open a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn, AuthError>;

    /// Register a credential pair, returning the new identity id
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, AuthError>;

    /// Remove the credential registered for `email`; unknown e-mails are a no-op
    async fn delete_account(&self, email: &str) -> Result<(), AuthError>;

    /// End the session behind `token`
    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;

    /// Resolve a session token to its principal
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}
