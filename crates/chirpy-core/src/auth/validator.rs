//! Credential validation for bearer tokens and the webhook API key

use std::sync::Arc;

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;

use super::{Claims, TokenKind, TokenSigner};
use crate::error::{AuthError, ChirpyError, CryptoError, Result};
use crate::user::{User, UserId, UserRepository};

const BEARER: &str = "Bearer";
const API_KEY: &str = "ApiKey";

/// A caller whose token passed every check
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    /// The raw credential, needed by refresh and revoke
    pub token: String,
    pub claims: Claims,
}

/// Split an `Authorization` value into exactly `<scheme> <credential>`
fn credential<'a>(header: Option<&'a str>, scheme: &str) -> std::result::Result<&'a str, AuthError> {
    let header = match header {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Err(AuthError::MissingHeader),
    };

    let mut fields = header.split_whitespace();
    let (Some(got), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(AuthError::MalformedHeader);
    };

    if got != scheme {
        return Err(AuthError::UnsupportedScheme(got.to_string()));
    }
    Ok(value)
}

/// Resolves bearer tokens to users
#[derive(Clone)]
pub struct Authenticator {
    signer: Arc<dyn TokenSigner>,
    users: UserRepository,
}

impl Authenticator {
    pub fn new(signer: Arc<dyn TokenSigner>, users: UserRepository) -> Self {
        Self { signer, users }
    }

    /// Validate `header` as a bearer token of `kind` and load its user
    pub fn authenticate(&self, header: Option<&str>, kind: TokenKind) -> Result<Authenticated> {
        self.authenticate_at(header, kind, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        header: Option<&str>,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Authenticated> {
        let result = self.resolve(header, kind, now);
        if let Err(ChirpyError::Unauthorized(reason)) = &result {
            tracing::debug!(%kind, %reason, "rejected bearer token");
        }
        result
    }

    fn resolve(&self, header: Option<&str>, kind: TokenKind, now: DateTime<Utc>) -> Result<Authenticated> {
        let token = credential(header, BEARER)?;

        let claims = self
            .signer
            .verify(token, now)
            .map_err(|_| AuthError::InvalidToken)?;

        if claims.kind() != Some(kind) {
            return Err(AuthError::WrongTokenKind { expected: kind }.into());
        }

        let user_id: UserId = claims.user_id().ok_or(AuthError::InvalidToken)?;
        let user = match self.users.get_by_id(user_id) {
            Ok(user) => user,
            Err(ChirpyError::NotFound { .. }) => return Err(AuthError::UserNotFound.into()),
            Err(err) => return Err(err),
        };

        Ok(Authenticated {
            user,
            token: token.to_string(),
            claims,
        })
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("users", &self.users)
            .finish_non_exhaustive()
    }
}

/// Checks the shared key the billing provider sends as `ApiKey <key>`
#[derive(Clone)]
pub struct ApiKeyValidator {
    key: String,
}

impl ApiKeyValidator {
    /// Fails with `MissingSecret` on an empty key
    pub fn new(key: impl Into<String>) -> std::result::Result<Self, CryptoError> {
        let key = key.into();
        if key.is_empty() {
            return Err(CryptoError::MissingSecret);
        }
        Ok(Self { key })
    }

    pub fn validate(&self, header: Option<&str>) -> Result<()> {
        let presented = credential(header, API_KEY)?;
        if bool::from(presented.as_bytes().ct_eq(self.key.as_bytes())) {
            Ok(())
        } else {
            tracing::debug!("rejected webhook API key");
            Err(AuthError::InvalidApiKey.into())
        }
    }
}

impl std::fmt::Debug for ApiKeyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyValidator")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::auth::{HmacSigner, TokenIssuer};
    use crate::storage::Database;

    struct Fixture {
        _dir: tempfile::TempDir,
        issuer: TokenIssuer,
        auth: Authenticator,
        walt: User,
    }

    fn setup() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::create(dir.path().join("database.json")).unwrap());
        let users = UserRepository::new(db);
        let walt = users.create("walt@breakingbad.com", "hash").unwrap();

        let signer: Arc<dyn TokenSigner> = Arc::new(HmacSigner::new("test-secret").unwrap());
        Fixture {
            _dir: dir,
            issuer: TokenIssuer::new(signer.clone()),
            auth: Authenticator::new(signer, users),
            walt,
        }
    }

    fn unauthorized(err: ChirpyError) -> AuthError {
        match err {
            ChirpyError::Unauthorized(reason) => reason,
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn test_header_parsing() {
        assert_eq!(credential(None, BEARER), Err(AuthError::MissingHeader));
        assert_eq!(credential(Some(""), BEARER), Err(AuthError::MissingHeader));
        assert_eq!(credential(Some("Bearer"), BEARER), Err(AuthError::MalformedHeader));
        assert_eq!(credential(Some("Bearer a b"), BEARER), Err(AuthError::MalformedHeader));
        assert_eq!(
            credential(Some("Basic abc"), BEARER),
            Err(AuthError::UnsupportedScheme("Basic".to_string()))
        );
        assert_eq!(credential(Some("Bearer   abc "), BEARER), Ok("abc"));
    }

    #[test]
    fn test_authenticate_access_token() {
        let f = setup();
        let token = f.issuer.issue(TokenKind::Access, f.walt.id).unwrap();
        let header = format!("Bearer {token}");

        let caller = f.auth.authenticate(Some(&header), TokenKind::Access).unwrap();
        assert_eq!(caller.user, f.walt);
        assert_eq!(caller.token, token);
    }

    #[test]
    fn test_kind_separation() {
        let f = setup();
        let access = format!("Bearer {}", f.issuer.issue(TokenKind::Access, f.walt.id).unwrap());
        let refresh = format!("Bearer {}", f.issuer.issue(TokenKind::Refresh, f.walt.id).unwrap());

        let err = f.auth.authenticate(Some(&refresh), TokenKind::Access).unwrap_err();
        assert_eq!(
            unauthorized(err),
            AuthError::WrongTokenKind { expected: TokenKind::Access }
        );

        let err = f.auth.authenticate(Some(&access), TokenKind::Refresh).unwrap_err();
        assert_eq!(
            unauthorized(err),
            AuthError::WrongTokenKind { expected: TokenKind::Refresh }
        );
    }

    #[test]
    fn test_expired_token() {
        let f = setup();
        let issued = Utc::now() - Duration::hours(2);
        let token = f.issuer.issue_at(TokenKind::Access, f.walt.id, issued).unwrap();

        let err = f
            .auth
            .authenticate(Some(&format!("Bearer {token}")), TokenKind::Access)
            .unwrap_err();
        assert_eq!(unauthorized(err), AuthError::InvalidToken);
    }

    #[test]
    fn test_unknown_subject() {
        let f = setup();
        let token = f.issuer.issue(TokenKind::Access, UserId(99)).unwrap();

        let err = f
            .auth
            .authenticate(Some(&format!("Bearer {token}")), TokenKind::Access)
            .unwrap_err();
        assert_eq!(unauthorized(err), AuthError::UserNotFound);
    }

    #[test]
    fn test_garbage_token() {
        let f = setup();
        let err = f
            .auth
            .authenticate(Some("Bearer not-a-jwt"), TokenKind::Access)
            .unwrap_err();
        assert_eq!(unauthorized(err), AuthError::InvalidToken);
    }

    #[test]
    fn test_api_key() {
        let validator = ApiKeyValidator::new("f271c81ff7084ee5b99a5091b42d486e").unwrap();

        assert!(validator
            .validate(Some("ApiKey f271c81ff7084ee5b99a5091b42d486e"))
            .is_ok());
        assert_eq!(
            unauthorized(validator.validate(Some("ApiKey wrong")).unwrap_err()),
            AuthError::InvalidApiKey
        );
        assert_eq!(
            unauthorized(
                validator
                    .validate(Some("Bearer f271c81ff7084ee5b99a5091b42d486e"))
                    .unwrap_err()
            ),
            AuthError::UnsupportedScheme("Bearer".to_string())
        );
        assert_eq!(
            unauthorized(validator.validate(None).unwrap_err()),
            AuthError::MissingHeader
        );
        assert!(ApiKeyValidator::new("").is_err());
    }
}
