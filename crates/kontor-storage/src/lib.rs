//! Kontor Storage Layer
//!
//! SQLite-based persistence for the client's durable state.
//! The credential slot mirrors the in-memory session so a restart
//! can reconstruct it without re-authenticating.

mod credentials;
mod database;
mod error;
mod migrations;

pub use credentials::{CredentialStore, StoredCredentials};
pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
