//! Revoked token ids
//!
//! Signed-out tokens stay listed until their own expiry; after that the JWT
//! check rejects them anyway and the entry can be purged.

use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct RevocationList {
    /// jti -> expiry (unix seconds)
    entries: DashMap<String, i64>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, jti: &str, expires_at: i64) {
        self.entries.insert(jti.to_string(), expires_at);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.entries.contains_key(jti)
    }

    /// Drop entries whose token expired before `now`, returning how many
    pub fn purge_expired(&self, now: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_and_purge() {
        let list = RevocationList::new();
        list.revoke("a", 100);
        list.revoke("b", 300);
        assert!(list.is_revoked("a"));
        assert!(!list.is_revoked("c"));

        assert_eq!(list.purge_expired(200), 1);
        assert!(!list.is_revoked("a"));
        assert!(list.is_revoked("b"));
        assert_eq!(list.len(), 1);
    }
}
