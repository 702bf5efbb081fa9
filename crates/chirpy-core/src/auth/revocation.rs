//! Persisted set of revoked refresh tokens

use std::sync::Arc;

use crate::error::Result;
use crate::storage::Database;

#[derive(Debug, Clone)]
pub struct RevocationStore {
    db: Arc<Database>,
}

impl RevocationStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Add `token` to the revoked set. Revoking twice is a no-op.
    pub fn revoke(&self, token: &str) -> Result<()> {
        let inserted = self
            .db
            .update(|doc| -> Result<bool> { Ok(doc.revoked_tokens.insert(token.to_string())) })?;

        if inserted {
            tracing::info!("revoked refresh token");
        } else {
            tracing::debug!("refresh token already revoked");
        }
        Ok(())
    }

    pub fn is_revoked(&self, token: &str) -> Result<bool> {
        self.db.read(|doc| Ok(doc.revoked_tokens.contains(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::create(dir.path().join("database.json")).unwrap());
        let store = RevocationStore::new(db.clone());

        assert!(!store.is_revoked("tok").unwrap());
        store.revoke("tok").unwrap();
        store.revoke("tok").unwrap();

        assert!(store.is_revoked("tok").unwrap());
        assert!(!store.is_revoked("other").unwrap());
        assert_eq!(db.load().unwrap().revoked_tokens.len(), 1);
    }
}
