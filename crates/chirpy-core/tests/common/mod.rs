//! Shared fixtures for chirpy-core integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chirpy_core::{ApiKeyValidator, Chirpy, Database, HmacSigner, Pbkdf2Hasher, Session};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_API_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

/// A `Chirpy` over a throwaway document
pub struct TestApp {
    pub dir: tempfile::TempDir,
    pub chirpy: Chirpy,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db = Database::create(dir.path().join("database.json")).expect("failed to create database");
        let chirpy = build(Arc::new(db));
        Self { dir, chirpy }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("database.json")
    }

    /// Register `email` with a fixed password and log in
    pub fn signup(&self, email: &str) -> Session {
        self.chirpy
            .create_user(email, "password")
            .unwrap_or_else(|e| panic!("failed to create {email}: {e}"));
        self.chirpy
            .login(email, "password")
            .unwrap_or_else(|e| panic!("failed to log in {email}: {e}"))
    }
}

/// Wire a `Chirpy` with test capabilities over `db`
pub fn build(db: Arc<Database>) -> Chirpy {
    Chirpy::with_capabilities(
        db,
        Arc::new(HmacSigner::new(TEST_SECRET).expect("test secret is not empty")),
        // One round keeps password hashing out of the test runtime
        Arc::new(Pbkdf2Hasher::with_iterations(1)),
        ApiKeyValidator::new(TEST_API_KEY).expect("test key is not empty"),
    )
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn api_key() -> String {
    format!("ApiKey {TEST_API_KEY}")
}
