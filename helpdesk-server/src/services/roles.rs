//! Role Resolver
//!
//! Read-only lookup of `users/{identity_id}`. Does not enforce anything
//! itself; see [`crate::auth::permissions`].

use std::sync::Arc;

use shared::models::{Role, UserProfile};

use crate::store::{DocumentStore, StoreError};
use crate::utils::{AppError, AppResult};

/// Collection holding user profiles
pub const USERS_COLLECTION: &str = "users";

#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn DocumentStore>,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Profile document of an identity
    pub async fn profile(&self, identity_id: &str) -> AppResult<UserProfile> {
        let record = match self.store.get_by_id(USERS_COLLECTION, identity_id).await {
            Ok(record) => record,
            Err(StoreError::NotFound { .. }) => return Err(AppError::role_not_found(identity_id)),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_value(record.into_value())
            .map_err(|_| AppError::role_not_found(identity_id))
    }

    /// Role of an identity; a missing profile or an unrecognised role string
    /// yields `RoleNotFound`
    pub async fn resolve(&self, identity_id: &str) -> AppResult<Role> {
        let profile = self.profile(identity_id).await?;
        profile.parsed_role().ok_or_else(|| {
            tracing::warn!(
                identity_id = %identity_id,
                role = ?profile.role,
                "Profile has no recognised role"
            );
            AppError::role_not_found(identity_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Fields, MemoryStore};
    use serde_json::{Value, json};
    use shared::ErrorCode;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    async fn resolver_with(profiles: &[(&str, Value)]) -> RoleResolver {
        let store = Arc::new(MemoryStore::new());
        for (id, body) in profiles {
            store
                .put(USERS_COLLECTION, id, fields(body.clone()))
                .await
                .unwrap();
        }
        RoleResolver::new(store)
    }

    #[tokio::test]
    async fn test_resolve_roles() {
        let resolver = resolver_with(&[
            ("u1", json!({"name": "A", "email": "a@x.com", "role": "user"})),
            ("u2", json!({"name": "B", "email": "b@x.com", "role": "ict"})),
        ])
        .await;

        assert_eq!(resolver.resolve("u1").await.unwrap(), Role::User);
        assert_eq!(resolver.resolve("u2").await.unwrap(), Role::Ict);
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let resolver = resolver_with(&[]).await;
        let err = resolver.resolve("ghost").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleNotFound);
    }

    #[tokio::test]
    async fn test_unrecognised_or_missing_role() {
        let resolver = resolver_with(&[
            ("u1", json!({"name": "A", "role": "admin"})),
            ("u2", json!({"name": "B"})),
            ("u3", json!({"name": "C", "role": "ICT"})),
        ])
        .await;

        for id in ["u1", "u2", "u3"] {
            let err = resolver.resolve(id).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::RoleNotFound, "identity {}", id);
        }
    }
}
