//! Password hashing capability

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// One-way password hashing with salted, self-describing output
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh random salt
    fn hash(&self, password: &str) -> Result<String, CryptoError>;

    /// Check `password` against a value produced by [`PasswordHasher::hash`]
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CryptoError>;
}

/// PBKDF2-HMAC-SHA256 hashes encoded as `pbkdf2-sha256$<rounds>$<salt>$<key>`
#[derive(Debug, Clone)]
pub struct Pbkdf2Hasher {
    iterations: u32,
}

impl Pbkdf2Hasher {
    pub const DEFAULT_ITERATIONS: u32 = 100_000;

    pub fn new() -> Self {
        Self::with_iterations(Self::DEFAULT_ITERATIONS)
    }

    /// Cheaper hashing for tests. Zero rounds is raised to one.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

fn derive(password: &str, salt: &[u8], rounds: u32, out: &mut [u8]) -> Result<(), CryptoError> {
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, rounds, out)
        .map_err(|e| CryptoError::Hashing(e.to_string()))
}

impl PasswordHasher for Pbkdf2Hasher {
    fn hash(&self, password: &str) -> Result<String, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let mut key = [0u8; KEY_LEN];
        derive(password, &salt, self.iterations, &mut key)?;

        Ok(format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(key)
        ))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CryptoError> {
        let malformed = || CryptoError::Hashing("malformed password hash".to_string());

        let mut parts = hash.split('$');
        let (Some(SCHEME), Some(rounds), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(malformed());
        };

        let rounds: u32 = rounds.parse().map_err(|_| malformed())?;
        let salt = STANDARD_NO_PAD.decode(salt).map_err(|_| malformed())?;
        let expected = STANDARD_NO_PAD.decode(expected).map_err(|_| malformed())?;
        if rounds == 0 || expected.is_empty() {
            return Err(malformed());
        }

        // Rounds come from the stored hash, not from `self`
        let mut key = vec![0u8; expected.len()];
        derive(password, &salt, rounds, &mut key)?;

        Ok(key.ct_eq(&expected).into())
    }
}
