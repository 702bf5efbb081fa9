//! Token kinds and claim sets

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::user::UserId;

const JTI_LEN: usize = 16;

/// Which endpoint family a token is good for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential for API calls
    Access,
    /// Long-lived credential that can only mint access tokens
    Refresh,
}

impl TokenKind {
    /// Value written to the `iss` claim
    pub fn issuer(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    /// How long a freshly issued token stays valid
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenKind::Access => Duration::hours(1),
            TokenKind::Refresh => Duration::days(60),
        }
    }

    /// Look up the kind named by an `iss` claim
    pub fn from_issuer(issuer: &str) -> Option<Self> {
        match issuer {
            "access" => Some(TokenKind::Access),
            "refresh" => Some(TokenKind::Refresh),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.issuer())
    }
}

/// Registered JWT claims carried by both token kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, one of [`TokenKind::issuer`]
    pub iss: String,
    /// Subject: the user id in decimal
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
    /// Random token id, unique per issue
    pub jti: String,
}

impl Claims {
    /// Build a fresh claim set for `user_id` issued at `now`
    pub fn new(kind: TokenKind, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            iss: kind.issuer().to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + kind.lifetime()).timestamp(),
            jti: token_id(),
        }
    }

    /// The kind named by the issuer, if it names one
    pub fn kind(&self) -> Option<TokenKind> {
        TokenKind::from_issuer(&self.iss)
    }

    /// The subject as a user id
    pub fn user_id(&self) -> Option<UserId> {
        UserId::parse(&self.sub)
    }

    /// Whether the token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

fn token_id() -> String {
    let mut bytes = [0u8; JTI_LEN];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
