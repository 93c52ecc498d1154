//! API error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session error: {0}")]
    Session(#[from] kontor_session::SessionError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-success response that is not the 401 handled by the
    /// interceptor; surfaced to the calling screen unmodified.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
}
