//! Persistence layer for chirpy state
//!
//! Provides a single JSON document holding chirps, users, and revoked tokens.

mod database;
mod document;

pub use database::Database;
pub use document::{Document, Sequences};
