//! Auth State Machine
//!
//! ```text
//! Anonymous
//!   ↓ signin
//! Authenticated
//!   ↓ proactive timer / 401 on a protected request
//! Refreshing
//!   ↓ refresh ok → Authenticated
//!   ↓ refresh failed → Anonymous
//! ```
//!
//! Logout drops to `Anonymous` from any state. There is no terminal
//! state; `Anonymous` is both initial and re-enterable.

use crate::session::Session;

/// Current lifecycle state, carrying the session where one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No session; protected requests are not possible
    Anonymous,
    /// Valid session held
    Authenticated(Session),
    /// Session held, but a renewal call is in flight
    Refreshing(Session),
}

/// Just the phase, for logging and guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticated,
    Refreshing,
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        match self {
            AuthState::Anonymous => AuthPhase::Anonymous,
            AuthState::Authenticated(_) => AuthPhase::Authenticated,
            AuthState::Refreshing(_) => AuthPhase::Refreshing,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated(session) | AuthState::Refreshing(session) => Some(session),
        }
    }
}

impl AuthPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthPhase::Anonymous => "anonymous",
            AuthPhase::Authenticated => "authenticated",
            AuthPhase::Refreshing => "refreshing",
        }
    }
}

impl std::fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn test_session() -> Session {
        Session::new(
            "tok1".to_string(),
            "ref1".to_string(),
            Utc::now() + Duration::hours(1),
        )
    }

    #[test]
    fn test_phase_and_session_access() {
        assert_eq!(AuthState::Anonymous.phase(), AuthPhase::Anonymous);
        assert!(AuthState::Anonymous.session().is_none());

        let authenticated = AuthState::Authenticated(test_session());
        assert_eq!(authenticated.phase(), AuthPhase::Authenticated);
        assert_eq!(authenticated.session().unwrap().access_token, "tok1");

        let refreshing = AuthState::Refreshing(test_session());
        assert_eq!(refreshing.phase(), AuthPhase::Refreshing);
        assert!(refreshing.session().is_some());
    }
}
