//! Error types for chirpy-core

use thiserror::Error;

/// Result type alias for chirpy operations
pub type Result<T> = std::result::Result<T, ChirpyError>;

/// Main error type for chirpy operations.
///
/// Every variant is a distinct kind; match on the variant (or on [`ErrorKind`])
/// instead of on the rendered message.
#[derive(Error, Debug)]
pub enum ChirpyError {
    /// The addressed entity does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: Entity, key: String },

    /// Another user already owns the email address
    #[error("email taken")]
    EmailTaken,

    /// The requester is not the author of the chirp
    #[error("chirp is not owned by this user")]
    NotAuthor,

    /// Chirp body failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Credential was missing, malformed, expired, revoked, or of the wrong kind
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// Storage or cryptography failure; the detail is only available via `source()`
    #[error("internal error")]
    Internal(#[source] InternalError),
}

/// Entity types addressed by [`ChirpyError::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Chirp,
    User,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Chirp => write!(f, "chirp"),
            Entity::User => write!(f, "user"),
        }
    }
}

/// Flat error classification for status-code mapping at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    EmailTaken,
    NotAuthor,
    ValidationEmpty,
    ValidationTooLong,
    Unauthorized,
    Internal,
}

impl ChirpyError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChirpyError::NotFound { .. } => ErrorKind::NotFound,
            ChirpyError::EmailTaken => ErrorKind::EmailTaken,
            ChirpyError::NotAuthor => ErrorKind::NotAuthor,
            ChirpyError::Validation(ValidationError::Empty) => ErrorKind::ValidationEmpty,
            ChirpyError::Validation(ValidationError::TooLong { .. }) => {
                ErrorKind::ValidationTooLong
            }
            ChirpyError::Unauthorized(_) => ErrorKind::Unauthorized,
            ChirpyError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn chirp_not_found(key: impl std::fmt::Display) -> Self {
        ChirpyError::NotFound {
            entity: Entity::Chirp,
            key: key.to_string(),
        }
    }

    pub(crate) fn user_not_found(key: impl std::fmt::Display) -> Self {
        ChirpyError::NotFound {
            entity: Entity::User,
            key: key.to_string(),
        }
    }
}

/// Chirp body validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Body has no characters
    #[error("chirp is empty")]
    Empty,

    /// Body is longer than the allowed maximum
    #[error("chirp is too long: {len} > {max}")]
    TooLong { len: usize, max: usize },
}

/// Reasons a credential was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("malformed Authorization header")]
    MalformedHeader,

    #[error("authorization scheme {0:?} is not supported")]
    UnsupportedScheme(String),

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("{expected} token required")]
    WrongTokenKind { expected: crate::auth::TokenKind },

    #[error("user not found")]
    UserNotFound,

    #[error("token is revoked")]
    Revoked,

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("invalid API key")]
    InvalidApiKey,
}

/// Failures that are never the caller's fault
#[derive(Error, Debug)]
pub enum InternalError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Storage engine errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a valid document
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// The document could not be serialized
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// A thread panicked while holding the document lock
    #[error("document lock poisoned")]
    Poisoned,
}

/// Signing, verification, and hashing failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// No signing secret was configured
    #[error("signing secret is empty")]
    MissingSecret,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<StorageError> for ChirpyError {
    fn from(err: StorageError) -> Self {
        ChirpyError::Internal(InternalError::Storage(err))
    }
}

impl From<CryptoError> for ChirpyError {
    fn from(err: CryptoError) -> Self {
        ChirpyError::Internal(InternalError::Crypto(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ChirpyError::chirp_not_found(3).kind(), ErrorKind::NotFound);
        assert_eq!(ChirpyError::EmailTaken.kind(), ErrorKind::EmailTaken);
        assert_eq!(
            ChirpyError::from(ValidationError::TooLong { len: 141, max: 140 }).kind(),
            ErrorKind::ValidationTooLong
        );
        assert_eq!(
            ChirpyError::from(AuthError::Revoked).kind(),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "/var/lib/chirpy/db.json");
        let err = ChirpyError::from(StorageError::Io(io));
        assert_eq!(err.to_string(), "internal error");
        assert_eq!(err.kind(), ErrorKind::Internal);

        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("db.json"));
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(ChirpyError::user_not_found(7).to_string(), "user not found: 7");
    }
}
