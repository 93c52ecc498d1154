//! Kontor Core
//!
//! Central coordination layer for the Kontor client: configuration,
//! wiring of storage/session/API, and the aggregated error type.

mod app;
mod config;
mod error;

pub use app::App;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use kontor_api::{ApiClient, ApiError, HttpAuthBackend};
pub use kontor_session::{
    check_route, signin_redirect, AuthPhase, RouteDecision, Session, SessionError, SessionManager,
};
pub use kontor_storage::{CredentialStore, Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
