//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Signin/signup rejected by the backend; the message is shown to
    /// the user verbatim.
    #[error("{0}")]
    Credentials(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] kontor_storage::StorageError),
}
