//! Repository for user accounts on top of the storage engine

use std::sync::Arc;

use super::{User, UserId};
use crate::error::{ChirpyError, Result};
use crate::storage::{Database, Document};

/// User operations against the shared document
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a new user. Emails are compared case-sensitively.
    pub fn create(&self, email: impl Into<String>, password_hash: impl Into<String>) -> Result<User> {
        let email = email.into();
        let password_hash = password_hash.into();

        let user = self.db.update(|doc| -> Result<User> {
            if email_owner(doc, &email).is_some() {
                return Err(ChirpyError::EmailTaken);
            }

            let id = doc.next_user_id();
            let user = User {
                id,
                email,
                password_hash,
                is_chirpy_red: false,
            };
            doc.users.insert(id, user.clone());
            Ok(user)
        })?;

        tracing::info!(user_id = %user.id, "created user");
        Ok(user)
    }

    pub fn get_by_email(&self, email: &str) -> Result<User> {
        self.db.read(|doc| {
            email_owner(doc, email)
                .cloned()
                .ok_or_else(|| ChirpyError::user_not_found(email))
        })
    }

    pub fn get_by_id(&self, id: UserId) -> Result<User> {
        self.db.read(|doc| {
            doc.users
                .get(&id)
                .cloned()
                .ok_or_else(|| ChirpyError::user_not_found(id))
        })
    }

    /// Overwrite both the email and the password hash.
    ///
    /// Fails with `EmailTaken` if a different user already has `email`.
    pub fn update(
        &self,
        id: UserId,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<User> {
        let email = email.into();
        let password_hash = password_hash.into();

        let user = self.db.update(|doc| -> Result<User> {
            if email_owner(doc, &email).is_some_and(|owner| owner.id != id) {
                return Err(ChirpyError::EmailTaken);
            }

            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| ChirpyError::user_not_found(id))?;
            user.email = email;
            user.password_hash = password_hash;
            Ok(user.clone())
        })?;

        tracing::info!(user_id = %id, "updated user");
        Ok(user)
    }

    /// Mark a user as a Chirpy Red subscriber. Upgrading twice is a no-op.
    pub fn upgrade_to_red(&self, id: UserId) -> Result<User> {
        let user = self.db.update(|doc| -> Result<User> {
            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| ChirpyError::user_not_found(id))?;
            user.is_chirpy_red = true;
            Ok(user.clone())
        })?;

        tracing::info!(user_id = %id, "upgraded user to chirpy red");
        Ok(user)
    }
}

fn email_owner<'a>(doc: &'a Document, email: &str) -> Option<&'a User> {
    doc.users.values().find(|u| u.email == email)
}
