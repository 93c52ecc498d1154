//! Kontor Session Management
//!
//! Owns the bearer-credential lifecycle for the client:
//! - a single session slot per client context, mirrored to durable storage
//! - proactive renewal a fixed lead time before expiry
//! - reactive renewal when a protected request is rejected with 401,
//!   with at most one refresh call in flight at any instant
//! - unconditional invalidation on logout or refresh failure

mod backend;
mod error;
mod guard;
mod manager;
mod session;
mod state;

pub use backend::{
    is_auth_endpoint, AuthBackend, PasswordChange, ProfileUpdate, SessionTokens, SignupRequest,
    UserProfile,
};
pub use error::SessionError;
pub use guard::{check_route, signin_redirect, RouteDecision};
pub use manager::SessionManager;
pub use session::Session;
pub use state::{AuthPhase, AuthState};

pub type Result<T> = std::result::Result<T, SessionError>;
