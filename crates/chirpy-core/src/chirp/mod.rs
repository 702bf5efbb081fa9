//! Chirps: short text posts and their repository

#[allow(clippy::module_inception)]
mod chirp;
mod repository;

pub use chirp::{clean_body, validate_body, Chirp, ChirpId, ProfanityFilter, CENSOR, MAX_CHIRP_LENGTH};
pub use repository::ChirpRepository;
