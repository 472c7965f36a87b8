//! Local identity provider
//!
//! Credentials live in the `credentials` collection keyed by the normalized
//! e-mail address. Passwords are argon2 hashed; sessions are JWTs whose id is
//! added to the [`RevocationList`] on sign-out.

use std::sync::{Arc, LazyLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::client::{MIN_PASSWORD_LEN, normalize_email};

use super::{AuthError, IdentityProvider, Principal, RevocationList, SignIn};
use crate::auth::JwtService;
use crate::security_log;
use crate::store::{DocumentStore, Fields, StoreError};

/// Collection holding credential documents
pub const CREDENTIALS_COLLECTION: &str = "credentials";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credential {
    identity_id: String,
    email: String,
    display_name: String,
    password_hash: String,
    created_at: String,
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Provider(format!("Failed to hash password: {}", e)))
}

/// Checked on unknown e-mails; every failed sign-in costs one argon2 verification
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("helpdesk-dummy-password").ok());

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::Provider(format!("Corrupt password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub struct LocalIdentityProvider {
    store: Arc<dyn DocumentStore>,
    jwt: Arc<JwtService>,
    revocations: Arc<RevocationList>,
}

impl LocalIdentityProvider {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        jwt: Arc<JwtService>,
        revocations: Arc<RevocationList>,
    ) -> Self {
        Self {
            store,
            jwt,
            revocations,
        }
    }

    async fn find_credential(&self, email: &str) -> Result<Option<Credential>, AuthError> {
        match self.store.get_by_id(CREDENTIALS_COLLECTION, email).await {
            Ok(record) => {
                let credential = serde_json::from_value(record.into_value())
                    .map_err(|e| AuthError::Provider(format!("Malformed credential: {}", e)))?;
                Ok(Some(credential))
            }
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn, AuthError> {
        let email = normalize_email(email);

        // Same error for unknown e-mail and wrong password
        let credential = match self.find_credential(&email).await? {
            Some(c) if verify_password(password, &c.password_hash)? => c,
            Some(_) => {
                security_log!("WARN", "login_failed", email = email.as_str(), reason = "password");
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                if let Some(dummy) = DUMMY_HASH.as_deref() {
                    let _ = verify_password(password, dummy);
                }
                security_log!("WARN", "login_failed", email = email.as_str(), reason = "unknown");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.jwt.generate_token(
            &credential.identity_id,
            &credential.email,
            &credential.display_name,
        )?;

        Ok(SignIn {
            identity_id: credential.identity_id,
            token,
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, AuthError> {
        let email = normalize_email(email);
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }
        if self.find_credential(&email).await?.is_some() {
            return Err(AuthError::EmailTaken(email));
        }

        let credential = Credential {
            identity_id: uuid::Uuid::new_v4().simple().to_string(),
            email: email.clone(),
            display_name: display_name.trim().to_string(),
            password_hash: hash_password(password)?,
            created_at: Utc::now().to_rfc3339(),
        };
        let identity_id = credential.identity_id.clone();

        let fields: Fields = match serde_json::to_value(&credential) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(AuthError::Provider("Failed to encode credential".to_string()));
            }
        };
        self.store
            .put(CREDENTIALS_COLLECTION, &email, fields)
            .await?;

        tracing::info!(identity_id = %identity_id, email = %email, "Identity registered");
        Ok(identity_id)
    }

    async fn delete_account(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        match self.store.delete(CREDENTIALS_COLLECTION, &email).await {
            Ok(()) | Err(StoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        match self.jwt.validate_token(token) {
            Ok(claims) => {
                self.revocations.revoke(&claims.jti, claims.exp);
                tracing::debug!(identity_id = %claims.sub, "Session revoked");
                Ok(())
            }
            // Nothing left to revoke
            Err(crate::auth::JwtError::ExpiredToken) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.jwt.validate_token(token)?;
        if self.revocations.is_revoked(&claims.jti) {
            return Err(AuthError::TokenRevoked);
        }
        Ok(Principal {
            identity_id: claims.sub,
            email: claims.email,
            display_name: claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::store::MemoryStore;

    fn provider() -> LocalIdentityProvider {
        let jwt = JwtService::with_config(JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            expiration_minutes: 60,
            issuer: "helpdesk-server".to_string(),
            audience: "helpdesk-clients".to_string(),
        });
        LocalIdentityProvider::new(
            Arc::new(MemoryStore::new()),
            Arc::new(jwt),
            Arc::new(RevocationList::new()),
        )
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let idp = provider();
        let id = idp
            .sign_up(" Chime@Example.org ", "secret1", "Chime")
            .await
            .unwrap();

        let session = idp.sign_in("chime@example.org", "secret1").await.unwrap();
        assert_eq!(session.identity_id, id);

        let principal = idp.verify(&session.token).await.unwrap();
        assert_eq!(principal.identity_id, id);
        assert_eq!(principal.email, "chime@example.org");
        assert_eq!(principal.display_name, "Chime");
    }

    #[tokio::test]
    async fn test_sign_up_rules() {
        let idp = provider();
        assert!(matches!(
            idp.sign_up("a@example.org", "12345", "A").await,
            Err(AuthError::WeakPassword(6))
        ));
        idp.sign_up("a@example.org", "123456", "A").await.unwrap();
        assert!(matches!(
            idp.sign_up("A@example.org", "abcdef", "A2").await,
            Err(AuthError::EmailTaken(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let idp = provider();
        idp.sign_up("a@example.org", "123456", "A").await.unwrap();
        assert!(matches!(
            idp.sign_in("a@example.org", "654321").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            idp.sign_in("b@example.org", "123456").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_dummy_hash_never_matches() {
        let dummy = DUMMY_HASH.as_deref().unwrap();
        assert!(dummy.starts_with("$argon2"));
        assert!(!verify_password("123456", dummy).unwrap());
    }

    #[tokio::test]
    async fn test_delete_account_frees_email() {
        let idp = provider();
        idp.sign_up("a@example.org", "123456", "A").await.unwrap();
        idp.delete_account(" A@example.org").await.unwrap();
        assert!(matches!(
            idp.sign_in("a@example.org", "123456").await,
            Err(AuthError::InvalidCredentials)
        ));
        idp.sign_up("a@example.org", "abcdef", "A").await.unwrap();

        // Unknown e-mail is a no-op
        idp.delete_account("nobody@example.org").await.unwrap();
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let idp = provider();
        idp.sign_up("a@example.org", "123456", "A").await.unwrap();
        let session = idp.sign_in("a@example.org", "123456").await.unwrap();

        idp.sign_out(&session.token).await.unwrap();
        assert!(matches!(
            idp.verify(&session.token).await,
            Err(AuthError::TokenRevoked)
        ));

        // A fresh sign-in is unaffected
        let again = idp.sign_in("a@example.org", "123456").await.unwrap();
        assert!(idp.verify(&again.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_garbage_token() {
        let idp = provider();
        assert!(matches!(
            idp.verify("not-a-jwt").await,
            Err(AuthError::InvalidToken(_))
        ));
    }
}
