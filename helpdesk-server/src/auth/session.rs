//! Session context
//!
//! Built once per request by the extractor and passed explicitly to every
//! service operation.

use shared::client::UserInfo;
use shared::models::Role;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub identity_id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl Session {
    pub fn new(
        identity_id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            identity_id: identity_id.into(),
            email: email.into(),
            display_name: display_name.into(),
            role,
        }
    }

    pub fn user_info(&self) -> UserInfo {
        UserInfo {
            id: self.identity_id.clone(),
            email: self.email.clone(),
            name: self.display_name.clone(),
            role: self.role,
        }
    }
}
