//! Auth backend contract
//!
//! The HTTP implementation lives in `kontor-api`; the trait is here so
//! the session manager can be exercised against an in-memory backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

pub const SIGNIN_PATH: &str = "/signin";
pub const SIGNUP_PATH: &str = "/signup";
pub const REFRESH_PATH: &str = "/refresh-token";
pub const RESEND_VERIFICATION_PATH: &str = "/resend-verification";
pub const CURRENT_USER_PATH: &str = "/user";

/// Routes that must never receive the bearer header from the
/// interceptor: they are credential-free or credential-supplying, and
/// `/user` is fetched with a manually attached header to avoid circular
/// initialization.
pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    matches!(
        path,
        SIGNIN_PATH | SIGNUP_PATH | REFRESH_PATH | RESEND_VERIFICATION_PATH | CURRENT_USER_PATH
    )
}

/// Payload of a successful signin or refresh response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// The remote authentication service, as consumed by the client.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange email/password for a fresh token set.
    async fn signin(&self, email: &str, password: &str) -> Result<SessionTokens>;

    /// Exchange the refresh token for a fresh token set.
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens>;

    async fn signup(&self, request: &SignupRequest) -> Result<()>;

    async fn resend_verification(&self, email: &str) -> Result<()>;

    /// Fetch the signed-in user's profile. Callers attach the bearer
    /// header themselves; this route bypasses the interceptor.
    async fn fetch_current_user(&self, access_token: &str) -> Result<UserProfile>;

    async fn update_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile>;

    async fn change_password(&self, access_token: &str, change: &PasswordChange) -> Result<()>;
}
