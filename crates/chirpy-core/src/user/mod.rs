//! User accounts and their repository

#[allow(clippy::module_inception)]
mod user;
mod repository;

pub use repository::UserRepository;
pub use user::{PublicUser, User, UserId};
