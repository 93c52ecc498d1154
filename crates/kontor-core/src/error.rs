//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] kontor_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] kontor_session::SessionError),

    #[error("API error: {0}")]
    Api(#[from] kontor_api::ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
