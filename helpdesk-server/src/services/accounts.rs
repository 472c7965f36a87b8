//! Account Service
//!
//! Registration, login and logout on top of the [`IdentityProvider`]. A
//! registration writes the `users/{identity_id}` profile that the
//! [`RoleResolver`] reads; the role is fixed from then on.

use std::sync::Arc;

use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo, normalize_email};
use shared::models::{Role, UserProfile};
use validator::Validate;

use super::roles::{RoleResolver, USERS_COLLECTION};
use crate::identity::IdentityProvider;
use crate::security_log;
use crate::store::{DocumentStore, Fields};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, from_validation_errors, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Clone)]
pub struct AccountService {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    roles: RoleResolver,
    allow_ict_registration: bool,
}

impl AccountService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        roles: RoleResolver,
        allow_ict_registration: bool,
    ) -> Self {
        Self {
            identity,
            store,
            roles,
            allow_ict_registration,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> AppResult<UserInfo> {
        let req = RegisterRequest {
            name: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            ..req
        };
        req.validate().map_err(|e| from_validation_errors(&e))?;
        validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
        if req.password.chars().count() > MAX_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "password is too long (max {MAX_PASSWORD_LEN})"
            )));
        }

        if req.role == Role::Ict && !self.allow_ict_registration {
            security_log!("WARN", "ict_registration_refused", email = req.email.as_str());
            return Err(AppError::with_message(
                ErrorCode::RegistrationClosed,
                "ICT accounts cannot be self-registered",
            ));
        }

        let identity_id = self
            .identity
            .sign_up(&req.email, &req.password, &req.name)
            .await?;

        let profile = UserProfile::new(&req.name, &req.email, req.role);
        let fields: Fields = match serde_json::to_value(&profile) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return Err(AppError::internal("Failed to encode user profile")),
        };
        if let Err(e) = self.store.put(USERS_COLLECTION, &identity_id, fields).await {
            // Without a profile the e-mail could never log in
            if let Err(rollback) = self.identity.delete_account(&req.email).await {
                tracing::error!(
                    identity_id = %identity_id,
                    error = %rollback,
                    "Failed to remove credential after profile write failure"
                );
            }
            return Err(e.into());
        }

        tracing::info!(
            identity_id = %identity_id,
            role = %req.role,
            "Account registered"
        );
        Ok(UserInfo {
            id: identity_id,
            email: req.email,
            name: req.name,
            role: req.role,
        })
    }

    /// Sign in and resolve the role. A token whose identity has no usable
    /// profile is revoked again before the error is returned.
    pub async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        let email = normalize_email(&req.email);
        if email.is_empty() || req.password.is_empty() {
            return Err(AppError::invalid_credentials());
        }

        let sign_in = self.identity.sign_in(&email, &req.password).await?;

        let resolved = match self.roles.profile(&sign_in.identity_id).await {
            Ok(profile) => profile
                .parsed_role()
                .map(|role| (profile, role))
                .ok_or_else(|| AppError::role_not_found(&sign_in.identity_id)),
            Err(e) => Err(e),
        };
        let (profile, role) = match resolved {
            Ok(found) => found,
            Err(e) => {
                if let Err(revoke_err) = self.identity.sign_out(&sign_in.token).await {
                    tracing::warn!(error = %revoke_err, "Failed to revoke token after role lookup failure");
                }
                security_log!(
                    "WARN",
                    "login_without_role",
                    identity_id = sign_in.identity_id.as_str()
                );
                return Err(e);
            }
        };

        tracing::info!(identity_id = %sign_in.identity_id, role = %role, "User logged in");
        Ok(LoginResponse {
            token: sign_in.token,
            user: UserInfo {
                id: sign_in.identity_id,
                email: if profile.email.is_empty() { email } else { profile.email },
                name: profile.name,
                role,
            },
        })
    }

    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.identity.sign_out(token).await?;
        Ok(())
    }
}
