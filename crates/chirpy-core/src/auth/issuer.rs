//! Token issuance

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{Claims, TokenKind, TokenSigner};
use crate::error::Result;
use crate::user::UserId;

/// Mints access and refresh tokens for a user
#[derive(Clone)]
pub struct TokenIssuer {
    signer: Arc<dyn TokenSigner>,
}

impl TokenIssuer {
    pub fn new(signer: Arc<dyn TokenSigner>) -> Self {
        Self { signer }
    }

    pub fn issue(&self, kind: TokenKind, user_id: UserId) -> Result<String> {
        self.issue_at(kind, user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, kind: TokenKind, user_id: UserId, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims::new(kind, user_id, now);
        let token = self.signer.sign(&claims)?;
        tracing::debug!(%user_id, %kind, exp = claims.exp, "issued token");
        Ok(token)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}
