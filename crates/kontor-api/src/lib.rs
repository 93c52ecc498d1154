//! Kontor API Layer
//!
//! reqwest-backed implementation of the auth backend contract, plus the
//! `ApiClient` every screen calls for protected resources: it attaches
//! the bearer credential and transparently renews it once when a
//! request comes back 401.

mod auth;
mod client;
mod error;
mod http;

pub use auth::HttpAuthBackend;
pub use client::{attach_credential, ApiClient};
pub use error::ApiError;

pub type Result<T> = std::result::Result<T, ApiError>;
