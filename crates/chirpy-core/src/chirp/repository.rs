//! Repository for chirp CRUD on top of the storage engine

use std::sync::Arc;

use super::{Chirp, ChirpId};
use crate::error::{ChirpyError, Result};
use crate::storage::Database;
use crate::user::UserId;

/// Chirp operations against the shared document
#[derive(Debug, Clone)]
pub struct ChirpRepository {
    db: Arc<Database>,
}

impl ChirpRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a new chirp under the next unused id.
    ///
    /// The body is stored as given; validation and cleaning happen before this call.
    pub fn create(&self, body: impl Into<String>, author_id: UserId) -> Result<Chirp> {
        let body = body.into();
        let chirp = self.db.update(|doc| -> Result<Chirp> {
            if !doc.users.contains_key(&author_id) {
                return Err(ChirpyError::user_not_found(author_id));
            }

            let id = doc.next_chirp_id();
            let chirp = Chirp {
                id,
                body,
                author_id,
            };
            doc.chirps.insert(id, chirp.clone());
            Ok(chirp)
        })?;

        tracing::info!(chirp_id = %chirp.id, author_id = %author_id, "created chirp");
        Ok(chirp)
    }

    /// All chirps, ascending by id
    pub fn get_all(&self) -> Result<Vec<Chirp>> {
        self.db.read(|doc| Ok(doc.chirps.values().cloned().collect()))
    }

    /// Chirps written by one author, ascending by id
    pub fn get_by_author(&self, author_id: UserId) -> Result<Vec<Chirp>> {
        self.db.read(|doc| {
            Ok(doc
                .chirps
                .values()
                .filter(|c| c.author_id == author_id)
                .cloned()
                .collect())
        })
    }

    pub fn get_by_id(&self, id: ChirpId) -> Result<Chirp> {
        self.db.read(|doc| {
            doc.chirps
                .get(&id)
                .cloned()
                .ok_or_else(|| ChirpyError::chirp_not_found(id))
        })
    }

    /// Remove a chirp owned by `requester`.
    ///
    /// Fails with `NotFound` or `NotAuthor` without touching the document.
    pub fn delete(&self, id: ChirpId, requester: UserId) -> Result<()> {
        self.db.update(|doc| -> Result<()> {
            let chirp = doc
                .chirps
                .get(&id)
                .ok_or_else(|| ChirpyError::chirp_not_found(id))?;

            if chirp.author_id != requester {
                return Err(ChirpyError::NotAuthor);
            }

            doc.chirps.remove(&id);
            Ok(())
        })?;

        tracing::info!(chirp_id = %id, "deleted chirp");
        Ok(())
    }
}
