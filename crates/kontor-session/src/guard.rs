//! Route guard
//!
//! Decides, before a protected screen is entered, whether the session
//! is good for it. Denial carries the originally requested path so the
//! signin screen can return the user there afterwards.

use crate::manager::SessionManager;
use crate::state::AuthPhase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToSignin { return_url: String },
}

/// Deny when anonymous, or when the token is close enough to expiry
/// that a request issued from the screen could fail mid-flight.
pub fn check_route(manager: &SessionManager, requested_path: &str) -> RouteDecision {
    if manager.phase() == AuthPhase::Anonymous || manager.is_renewal_imminent() {
        return RouteDecision::RedirectToSignin {
            return_url: requested_path.to_string(),
        };
    }
    RouteDecision::Allow
}

/// Build the signin URL carrying the return target, e.g.
/// `/signin?returnUrl=%2Fsales-invoices`.
pub fn signin_redirect(return_url: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("returnUrl", return_url)
        .finish();
    format!("/signin?{}", query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        AuthBackend, PasswordChange, ProfileUpdate, SessionTokens, SignupRequest, UserProfile,
    };
    use crate::{Result, SessionError};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use kontor_storage::{CredentialStore, Database};
    use std::sync::Arc;

    struct NoopBackend;

    #[async_trait]
    impl AuthBackend for NoopBackend {
        async fn signin(&self, _email: &str, _password: &str) -> Result<SessionTokens> {
            Err(SessionError::Credentials("unused".to_string()))
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<SessionTokens> {
            Err(SessionError::Network("unused".to_string()))
        }

        async fn signup(&self, _request: &SignupRequest) -> Result<()> {
            Ok(())
        }

        async fn resend_verification(&self, _email: &str) -> Result<()> {
            Ok(())
        }

        async fn fetch_current_user(&self, _access_token: &str) -> Result<UserProfile> {
            Err(SessionError::NotAuthenticated)
        }

        async fn update_profile(
            &self,
            _access_token: &str,
            _update: &ProfileUpdate,
        ) -> Result<UserProfile> {
            Err(SessionError::NotAuthenticated)
        }

        async fn change_password(
            &self,
            _access_token: &str,
            _change: &PasswordChange,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn manager_with_expiry(minutes: i64) -> SessionManager {
        let store = CredentialStore::new(Database::open_in_memory().unwrap());
        store
            .save("tok1", "ref1", Utc::now() + Duration::minutes(minutes))
            .unwrap();
        let manager = SessionManager::new(store, Arc::new(NoopBackend), Duration::minutes(5));
        manager.initialize().unwrap();
        manager
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected_with_return_url() {
        let store = CredentialStore::new(Database::open_in_memory().unwrap());
        let manager = SessionManager::new(store, Arc::new(NoopBackend), Duration::minutes(5));

        let decision = check_route(&manager, "/payroll");
        assert_eq!(
            decision,
            RouteDecision::RedirectToSignin {
                return_url: "/payroll".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_imminent_expiry_is_redirected() {
        // Expires in 4 minutes, inside the 5 minute lead
        let manager = manager_with_expiry(4);

        let decision = check_route(&manager, "/sales-invoices");
        assert_eq!(
            decision,
            RouteDecision::RedirectToSignin {
                return_url: "/sales-invoices".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_live_session_is_allowed() {
        let manager = manager_with_expiry(60);
        assert_eq!(check_route(&manager, "/suppliers"), RouteDecision::Allow);
    }

    #[test]
    fn test_signin_redirect_encodes_return_url() {
        assert_eq!(
            signin_redirect("/sales-invoices"),
            "/signin?returnUrl=%2Fsales-invoices"
        );
    }
}
