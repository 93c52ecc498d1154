//! Session Manager
//!
//! Owns the session slot and the renewal machinery. The durable
//! credential slot is written in the same call as every in-memory
//! mutation, so a restart reconstructs the session without
//! re-authenticating.

use chrono::{Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

use kontor_storage::CredentialStore;

use crate::backend::{is_auth_endpoint, AuthBackend, SessionTokens, UserProfile};
use crate::error::SessionError;
use crate::session::Session;
use crate::state::{AuthPhase, AuthState};
use crate::Result;

pub struct SessionManager {
    /// Current lifecycle state, including the session where one exists
    state: Arc<RwLock<AuthState>>,
    /// Durable mirror of the session slot
    store: CredentialStore,
    /// Remote auth service
    backend: Arc<dyn AuthBackend>,
    /// How long before expiry a renewal counts as due
    refresh_lead: Duration,
    /// Serializes renewals: whoever holds this performs the single
    /// refresh call, everyone else waits for its outcome
    refresh_gate: Arc<AsyncMutex<()>>,
    /// Pending proactive-refresh timer, if armed
    refresh_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionManager {
    pub fn new(store: CredentialStore, backend: Arc<dyn AuthBackend>, refresh_lead: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(AuthState::Anonymous)),
            store,
            backend,
            refresh_lead,
            refresh_gate: Arc::new(AsyncMutex::new(())),
            refresh_timer: Arc::new(Mutex::new(None)),
        }
    }

    /// Restore the persisted session on startup.
    ///
    /// An already-expired slot is cleared rather than restored; a live
    /// one becomes the active session and arms the proactive timer.
    /// Must be called from within the tokio runtime.
    pub fn initialize(&self) -> Result<AuthPhase> {
        let stored = match self.store.load()? {
            Some(stored) => stored,
            None => {
                tracing::info!("No stored session found on startup");
                return Ok(AuthPhase::Anonymous);
            }
        };

        let session = Session::new(stored.access_token, stored.refresh_token, stored.expires_at);

        if session.is_expired_at(Utc::now()) {
            tracing::info!(
                expires_at = %session.expires_at,
                "Stored session already expired, clearing"
            );
            self.store.clear()?;
            return Ok(AuthPhase::Anonymous);
        }

        tracing::info!(expires_at = %session.expires_at, "Restored session from storage");
        *self.state.write() = AuthState::Authenticated(session);
        self.schedule_proactive_refresh();

        Ok(AuthPhase::Authenticated)
    }

    /// Sign in with email and password. On success the new session
    /// replaces any previous one and the proactive timer is armed.
    pub async fn signin(&self, email: &str, password: &str) -> Result<()> {
        tracing::debug!(email = %email, "Signing in");

        let tokens = self.backend.signin(email, password).await?;
        self.install_session(tokens)?;

        tracing::info!(email = %email, "Signed in");
        Ok(())
    }

    pub fn phase(&self) -> AuthPhase {
        self.state.read().phase()
    }

    /// Snapshot of the current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.state.read().session().cloned()
    }

    /// The bearer token to attach to a request for `path`, or `None`
    /// when anonymous or when the path is an auth endpoint. Never
    /// blocks and has no side effects.
    pub fn credential_for(&self, path: &str) -> Option<String> {
        if is_auth_endpoint(path) {
            return None;
        }
        self.state
            .read()
            .session()
            .map(|session| session.access_token.clone())
    }

    /// True when the access token expires within the refresh lead.
    /// Route guards use this to force re-signin up front instead of
    /// letting a request fail mid-flight.
    pub fn is_renewal_imminent(&self) -> bool {
        self.state
            .read()
            .session()
            .map(|session| session.renewal_imminent_at(Utc::now(), self.refresh_lead))
            .unwrap_or(false)
    }

    /// Renew the session after a protected request came back 401.
    ///
    /// `rejected_token` is the token the failed request carried. At
    /// most one refresh call is in flight at a time: concurrent callers
    /// queue on the gate, and whoever finds the token already rotated
    /// when its turn comes reuses that outcome instead of refreshing
    /// again. Returns the token to retry with.
    ///
    /// A failed refresh destroys the session and is never retried; the
    /// caller redirects to signin.
    pub async fn refresh_after_unauthorized(&self, rejected_token: &str) -> Result<String> {
        let _gate = self.refresh_gate.lock().await;

        // A refresh that settled while we queued covers this 401
        {
            let state = self.state.read();
            match state.session() {
                None => return Err(SessionError::SessionExpired),
                Some(session) if session.access_token != rejected_token => {
                    tracing::debug!("Token already rotated by a concurrent refresh");
                    return Ok(session.access_token.clone());
                }
                Some(_) => {}
            }
        }

        self.perform_refresh().await
    }

    /// Arm a one-shot timer that renews the session `refresh_lead`
    /// before expiry, replacing any previously armed timer. Returns
    /// false without arming when there is no session or the renewal
    /// point is already in the past (a refresh is owed; the caller
    /// decides whether to fire it immediately).
    pub fn schedule_proactive_refresh(&self) -> bool {
        self.cancel_timer();

        let delay = match self
            .state
            .read()
            .session()
            .and_then(|session| session.refresh_delay(Utc::now(), self.refresh_lead))
        {
            Some(delay) => delay,
            None => return false,
        };

        tracing::debug!(delay_secs = delay.as_secs(), "Armed proactive refresh timer");

        let manager = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let _gate = manager.refresh_gate.lock().await;
            if manager.state.read().session().is_none() {
                // Logged out while the timer was pending
                return;
            }
            if let Err(e) = manager.perform_refresh().await {
                tracing::warn!(error = %e, "Proactive refresh failed");
            }
        });

        *self.refresh_timer.lock() = Some(handle);
        true
    }

    /// Destroy the session unconditionally: cancel any pending timer,
    /// clear the durable slot, reset to `Anonymous`. Safe to call from
    /// any state, repeatedly.
    pub fn logout(&self) -> Result<()> {
        self.clear_session()?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Fetch the signed-in user's profile. The bearer header is passed
    /// explicitly; this call never goes through the interceptor.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let access_token = self
            .session()
            .map(|session| session.access_token)
            .ok_or(SessionError::NotAuthenticated)?;

        self.backend.fetch_current_user(&access_token).await
    }

    /// Perform the single refresh network call and apply its outcome.
    /// The caller must hold the refresh gate.
    async fn perform_refresh(&self) -> Result<String> {
        let refresh_token = {
            let mut state = self.state.write();
            let session = match state.session() {
                Some(session) => session.clone(),
                None => return Err(SessionError::SessionExpired),
            };
            let refresh_token = session.refresh_token.clone();
            *state = AuthState::Refreshing(session);
            refresh_token
        };

        tracing::debug!("Refreshing access token");

        match self.backend.refresh(&refresh_token).await {
            Ok(tokens) => {
                let access_token = tokens.access_token.clone();
                self.install_session(tokens)?;
                tracing::info!("Access token refreshed");
                Ok(access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh failed, clearing session");
                self.clear_session()?;
                Err(e)
            }
        }
    }

    /// Replace the session slot from a signin/refresh payload: persist
    /// all three fields, publish the in-memory copy, re-arm the timer.
    fn install_session(&self, tokens: SessionTokens) -> Result<()> {
        let session = Session::new(tokens.access_token, tokens.refresh_token, tokens.expires_at);

        self.store
            .save(&session.access_token, &session.refresh_token, session.expires_at)?;
        *self.state.write() = AuthState::Authenticated(session);
        self.schedule_proactive_refresh();

        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        self.cancel_timer();
        self.store.clear()?;
        *self.state.write() = AuthState::Anonymous;
        Ok(())
    }

    fn cancel_timer(&self) {
        if let Some(handle) = self.refresh_timer.lock().take() {
            handle.abort();
        }
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            store: self.store.clone(),
            backend: Arc::clone(&self.backend),
            refresh_lead: self.refresh_lead,
            refresh_gate: Arc::clone(&self.refresh_gate),
            refresh_timer: Arc::clone(&self.refresh_timer),
        }
    }
}
