//! Session Extractor
//!
//! Validates the `Authorization: Bearer` header through the identity
//! provider, resolves the role and hands handlers a ready [`Session`].

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{JwtService, Session};
use crate::core::ServerState;
use crate::identity::AuthError;
use crate::middleware::RequestIdentity;
use crate::security_log;
use crate::utils::AppError;

/// Raw bearer token of the request
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .map(|token| BearerToken(token.to_string()))
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header")),
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                Err(AppError::not_authenticated())
            }
        }
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let principal = match state.identity.verify(&token).await {
            Ok(principal) => principal,
            Err(e) => {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = format!("{}", e),
                    uri = format!("{:?}", parts.uri)
                );
                return Err(match e {
                    AuthError::TokenExpired => AppError::token_expired(),
                    AuthError::Provider(_) => e.into(),
                    _ => AppError::invalid_token("Invalid token"),
                });
            }
        };

        let role = state.roles.resolve(&principal.identity_id).await?;
        let session = Session::new(
            principal.identity_id,
            principal.email,
            principal.display_name,
            role,
        );

        if let Some(identity) = parts.extensions.get::<RequestIdentity>() {
            identity.record(&session);
        }
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}
