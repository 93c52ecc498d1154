//! Main client state container
//!
//! Wires storage, session, and the API client together. The UI layer
//! is purely a renderer; all session state lives here.

use std::sync::Arc;

use kontor_api::{ApiClient, HttpAuthBackend};
use kontor_session::{check_route, AuthPhase, RouteDecision, SessionManager};
use kontor_storage::{CredentialStore, Database};

use crate::config::Config;
use crate::Result;

pub struct App {
    /// Configuration
    config: Config,
    /// Database
    db: Database,
    /// Session manager
    session_manager: SessionManager,
    /// API client used by all protected screens
    api: ApiClient,
}

impl App {
    /// Create a new client instance
    pub fn new(config: Config) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        let store = CredentialStore::new(db.clone());
        let backend = Arc::new(HttpAuthBackend::new(config.api_base_url.clone()));
        let session_manager = SessionManager::new(store, backend, config.refresh_lead());
        let api = ApiClient::new(config.api_base_url.clone(), session_manager.clone());

        Ok(Self {
            config,
            db,
            session_manager,
            api,
        })
    }

    /// Restore client state (reconstructs the session from storage).
    /// Must be called from within the tokio runtime so the proactive
    /// refresh timer can be armed.
    pub fn initialize(&self) -> Result<AuthPhase> {
        let phase = self.session_manager.initialize()?;
        tracing::info!(phase = %phase, "Client initialized");
        Ok(phase)
    }

    // === Session operations ===

    pub async fn signin(&self, email: &str, password: &str) -> Result<()> {
        Ok(self.session_manager.signin(email, password).await?)
    }

    pub fn logout(&self) -> Result<()> {
        Ok(self.session_manager.logout()?)
    }

    /// Decide whether a protected screen may be entered.
    pub fn check_route(&self, requested_path: &str) -> RouteDecision {
        check_route(&self.session_manager, requested_path)
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session_manager
    }

    // === API access ===

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // === Config ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Clone for App {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            db: self.db.clone(),
            session_manager: self.session_manager.clone(),
            api: self.api.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_app() -> App {
        let config = Config::new(PathBuf::from("/tmp/kontor-test"));

        // In-memory database instead of the configured path
        let db = Database::open_in_memory().unwrap();
        let store = CredentialStore::new(db.clone());
        let backend = Arc::new(HttpAuthBackend::new(config.api_base_url.clone()));
        let session_manager = SessionManager::new(store, backend, config.refresh_lead());
        let api = ApiClient::new(config.api_base_url.clone(), session_manager.clone());

        App {
            config,
            db,
            session_manager,
            api,
        }
    }

    #[tokio::test]
    async fn test_app_starts_anonymous() {
        let app = test_app();

        assert_eq!(app.initialize().unwrap(), AuthPhase::Anonymous);

        match app.check_route("/suppliers") {
            RouteDecision::RedirectToSignin { return_url } => {
                assert_eq!(return_url, "/suppliers")
            }
            RouteDecision::Allow => panic!("Anonymous client must not enter protected routes"),
        }
    }

    #[tokio::test]
    async fn test_app_restores_persisted_session() {
        let app = test_app();

        let store = CredentialStore::new(app.database().clone());
        store
            .save(
                "tok1",
                "ref1",
                chrono::Utc::now() + chrono::Duration::hours(1),
            )
            .unwrap();

        assert_eq!(app.initialize().unwrap(), AuthPhase::Authenticated);
        assert_eq!(app.check_route("/suppliers"), RouteDecision::Allow);

        app.logout().unwrap();
        assert!(store.is_empty().unwrap());
    }
}
