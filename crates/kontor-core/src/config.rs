//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Renewal fires this long before the access token expires.
const DEFAULT_REFRESH_LEAD_SECS: u32 = 5 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Kontor backend API
    pub api_base_url: Url,
    /// Path to the local database file
    pub database_path: PathBuf,
    /// Seconds before expiry at which a session renewal counts as due
    pub refresh_lead_secs: u32,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            api_base_url: "https://api.kontor.app/v1"
                .parse()
                .expect("valid default URL"),
            database_path: data_dir.join("kontor.db"),
            refresh_lead_secs: DEFAULT_REFRESH_LEAD_SECS,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Kontor"))
            .unwrap_or_else(|| PathBuf::from(".kontor"))
    }

    pub fn refresh_lead(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.refresh_lead_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Simple dirs implementation for the local data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
