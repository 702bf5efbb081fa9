//! Authentication: password hashing, token signing, issuance, and validation
//!
//! The signing and hashing capabilities are traits so the repositories and
//! the facade never name a concrete algorithm.

mod issuer;
mod password;
mod revocation;
mod signer;
mod token;
mod validator;

pub use issuer::TokenIssuer;
pub use password::{PasswordHasher, Pbkdf2Hasher};
pub use revocation::RevocationStore;
pub use signer::{HmacSigner, TokenError, TokenSigner};
pub use token::{Claims, TokenKind};
pub use validator::{ApiKeyValidator, Authenticated, Authenticator};
