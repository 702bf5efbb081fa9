//! The `Chirpy` facade: one method per operation of the HTTP API
//!
//! Every operation that needs a caller takes the raw `Authorization` header
//! value and resolves it through the [`Authenticator`] before touching a
//! repository.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{
    ApiKeyValidator, Authenticator, HmacSigner, PasswordHasher, Pbkdf2Hasher, RevocationStore,
    TokenIssuer, TokenKind, TokenSigner,
};
use crate::chirp::{validate_body, Chirp, ChirpId, ChirpRepository, ProfanityFilter};
use crate::config::{AuthConfig, ChirpyConfig, StorageConfig};
use crate::error::{AuthError, ChirpyError, Result};
use crate::metrics::HitCounter;
use crate::storage::Database;
use crate::user::{PublicUser, UserId, UserRepository};
use crate::webhook::WebhookEvent;

/// A logged-in user with both tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(flatten)]
    pub user: PublicUser,
    /// Access token
    pub token: String,
    pub refresh_token: String,
}

/// Open the document the way `storage` asks for
pub fn open_database(storage: &StorageConfig) -> Result<Database> {
    let db = if storage.reset_on_start {
        Database::create(&storage.path)?
    } else {
        Database::open(&storage.path)?
    };
    Ok(db)
}

/// Everything the service needs, wired together
pub struct Chirpy {
    db: Arc<Database>,
    users: UserRepository,
    chirps: ChirpRepository,
    revocations: RevocationStore,
    hasher: Arc<dyn PasswordHasher>,
    issuer: TokenIssuer,
    authenticator: Authenticator,
    api_key: ApiKeyValidator,
    filter: ProfanityFilter,
    hits: HitCounter,
}

impl Chirpy {
    /// Open storage and build the service from a full configuration
    pub fn open(config: &ChirpyConfig) -> Result<Self> {
        let db = Arc::new(open_database(&config.storage)?);
        Self::new(db, &config.auth)
    }

    /// HS256 tokens and PBKDF2 passwords over `db`.
    ///
    /// Fails if either secret in `auth` is empty.
    pub fn new(db: Arc<Database>, auth: &AuthConfig) -> Result<Self> {
        let signer = Arc::new(HmacSigner::new(auth.jwt_secret.as_bytes())?);
        let api_key = ApiKeyValidator::new(auth.polka_api_key.as_str())?;
        Ok(Self::with_capabilities(
            db,
            signer,
            Arc::new(Pbkdf2Hasher::new()),
            api_key,
        ))
    }

    /// Build with explicit signing and hashing capabilities
    pub fn with_capabilities(
        db: Arc<Database>,
        signer: Arc<dyn TokenSigner>,
        hasher: Arc<dyn PasswordHasher>,
        api_key: ApiKeyValidator,
    ) -> Self {
        let users = UserRepository::new(db.clone());
        Self {
            chirps: ChirpRepository::new(db.clone()),
            revocations: RevocationStore::new(db.clone()),
            issuer: TokenIssuer::new(signer.clone()),
            authenticator: Authenticator::new(signer, users.clone()),
            users,
            hasher,
            api_key,
            db,
            filter: ProfanityFilter::default(),
            hits: HitCounter::new(),
        }
    }

    /// Replace the default word list
    pub fn with_filter(mut self, filter: ProfanityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn chirps(&self) -> &ChirpRepository {
        &self.chirps
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn hits(&self) -> &HitCounter {
        &self.hits
    }

    // Accounts

    pub fn create_user(&self, email: &str, password: &str) -> Result<PublicUser> {
        let hash = self.hasher.hash(password)?;
        Ok(self.users.create(email, hash)?.public())
    }

    /// Exchange credentials for an access token and a refresh token
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let user = match self.users.get_by_email(email) {
            Ok(user) => user,
            Err(ChirpyError::NotFound { .. }) => {
                tracing::debug!("login for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(err) => return Err(err),
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.issuer.issue(TokenKind::Access, user.id)?;
        let refresh_token = self.issuer.issue(TokenKind::Refresh, user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(Session {
            user: user.public(),
            token,
            refresh_token,
        })
    }

    /// Replace the caller's email and password
    pub fn update_user(&self, header: Option<&str>, email: &str, password: &str) -> Result<PublicUser> {
        let caller = self.authenticator.authenticate(header, TokenKind::Access)?;
        let hash = self.hasher.hash(password)?;
        Ok(self.users.update(caller.user.id, email, hash)?.public())
    }

    // Tokens

    /// Mint a new access token from a valid, unrevoked refresh token
    pub fn refresh(&self, header: Option<&str>) -> Result<String> {
        let caller = self.authenticator.authenticate(header, TokenKind::Refresh)?;
        if self.revocations.is_revoked(&caller.token)? {
            tracing::debug!(user_id = %caller.user.id, "refresh with revoked token");
            return Err(AuthError::Revoked.into());
        }
        self.issuer.issue(TokenKind::Access, caller.user.id)
    }

    /// Permanently invalidate the presented refresh token
    pub fn revoke(&self, header: Option<&str>) -> Result<()> {
        let caller = self.authenticator.authenticate(header, TokenKind::Refresh)?;
        self.revocations.revoke(&caller.token)
    }

    // Chirps

    pub fn create_chirp(&self, header: Option<&str>, body: &str) -> Result<Chirp> {
        let caller = self.authenticator.authenticate(header, TokenKind::Access)?;
        validate_body(body)?;
        self.chirps.create(self.filter.clean(body), caller.user.id)
    }

    /// All chirps by ascending id, optionally only those by `author`
    pub fn list_chirps(&self, author: Option<UserId>) -> Result<Vec<Chirp>> {
        match author {
            Some(author_id) => self.chirps.get_by_author(author_id),
            None => self.chirps.get_all(),
        }
    }

    pub fn get_chirp(&self, id: ChirpId) -> Result<Chirp> {
        self.chirps.get_by_id(id)
    }

    pub fn delete_chirp(&self, header: Option<&str>, id: ChirpId) -> Result<()> {
        let caller = self.authenticator.authenticate(header, TokenKind::Access)?;
        self.chirps.delete(id, caller.user.id)
    }

    // Billing

    /// Apply a billing webhook. Events other than `user.upgraded` are accepted
    /// and ignored.
    pub fn handle_webhook(&self, header: Option<&str>, event: &WebhookEvent) -> Result<()> {
        self.api_key.validate(header)?;

        if !event.is_upgrade() {
            tracing::debug!(event = %event.event, "ignoring webhook event");
            return Ok(());
        }
        self.users.upgrade_to_red(event.data.user_id)?;
        Ok(())
    }
}

impl std::fmt::Debug for Chirpy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chirpy")
            .field("db", &self.db)
            .field("hits", &self.hits)
            .finish_non_exhaustive()
    }
}
