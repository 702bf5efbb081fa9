//! Chirpy Core - storage and token lifecycle for a small social-post service
//!
//! This crate provides everything behind the HTTP surface of chirpy:
//!
//! - **Storage**: a single JSON document on disk with whole-document read-modify-write
//! - **Chirp**: short posts, body validation, and the profanity filter
//! - **User**: accounts with unique emails and the Chirpy Red flag
//! - **Auth**: password hashing, HS256 access/refresh tokens, revocation, API keys
//! - **Webhook**: billing provider event payloads
//! - **Metrics**: the file server hit counter
//! - **Config**: TOML configuration with environment overlays
//!
//! # Architecture
//!
//! ```text
//! Chirpy (facade)
//!   ├── Authenticator ── TokenSigner
//!   ├── UserRepository ─┐
//!   ├── ChirpRepository ├── Database ── database.json
//!   └── RevocationStore ┘
//! ```
//!
//! Every mutation runs inside [`Database::update`], so a repository call is one
//! exclusive critical section from load to persist. The API is synchronous.

pub mod app;
pub mod auth;
pub mod chirp;
pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod user;
pub mod webhook;

pub use app::{open_database, Chirpy, Session};
pub use auth::{
    ApiKeyValidator, Authenticated, Authenticator, Claims, HmacSigner, PasswordHasher,
    Pbkdf2Hasher, RevocationStore, TokenIssuer, TokenKind, TokenSigner,
};
pub use chirp::{Chirp, ChirpId, ChirpRepository, ProfanityFilter};
pub use config::{AuthConfig, ChirpyConfig, ConfigError, ServerConfig, StorageConfig};
pub use error::{AuthError, ChirpyError, ErrorKind, Result};
pub use metrics::HitCounter;
pub use storage::{Database, Document};
pub use user::{PublicUser, User, UserId, UserRepository};
pub use webhook::{WebhookData, WebhookEvent};
