//! Credential slot
//!
//! Single-slot durable mirror of the authenticated session: three fixed
//! keys (access token, refresh token, expiry). The slot is either fully
//! present or absent; a partial or malformed slot loads as absent.

use chrono::{DateTime, Utc};

use crate::database::Database;
use crate::Result;

const ACCESS_TOKEN_KEY: &str = "auth.access_token";
const REFRESH_TOKEN_KEY: &str = "auth.refresh_token";
const EXPIRES_AT_KEY: &str = "auth.expires_at";

/// The three credential values as read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Write all three values in one transaction.
    pub fn save(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        let expires_raw = expires_at.to_rfc3339();

        self.db.transaction(|conn| {
            for (key, value) in [
                (ACCESS_TOKEN_KEY, access_token),
                (REFRESH_TOKEN_KEY, refresh_token),
                (EXPIRES_AT_KEY, expires_raw.as_str()),
            ] {
                conn.execute(
                    "INSERT OR REPLACE INTO credentials (key, value, updated_at)
                     VALUES (?1, ?2, ?3)",
                    rusqlite::params![key, value, updated_at],
                )?;
            }
            Ok(())
        })
    }

    /// Load the slot. Returns `None` when any of the three values is
    /// missing or the stored expiry does not parse.
    pub fn load(&self) -> Result<Option<StoredCredentials>> {
        let access_token = self.get(ACCESS_TOKEN_KEY)?;
        let refresh_token = self.get(REFRESH_TOKEN_KEY)?;
        let expires_raw = self.get(EXPIRES_AT_KEY)?;

        let (access_token, refresh_token, expires_raw) =
            match (access_token, refresh_token, expires_raw) {
                (Some(a), Some(r), Some(e)) => (a, r, e),
                _ => return Ok(None),
            };

        let expires_at = match DateTime::parse_from_rfc3339(&expires_raw) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                tracing::warn!("Stored credential expiry is malformed, treating slot as absent");
                return Ok(None);
            }
        };

        Ok(Some(StoredCredentials {
            access_token,
            refresh_token,
            expires_at,
        }))
    }

    /// Remove all three values. Safe to call on an empty slot.
    pub fn clear(&self) -> Result<()> {
        self.db.transaction(|conn| {
            for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRES_AT_KEY] {
                conn.execute("DELETE FROM credentials WHERE key = ?1", [key])?;
            }
            Ok(())
        })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.load()?.is_none())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        use rusqlite::OptionalExtension;

        self.db.with_connection(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM credentials WHERE key = ?1",
                    [key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    #[cfg(test)]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO credentials (key, value, updated_at)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, updated_at],
            )?;
            Ok(())
        })
    }
}

impl Clone for CredentialStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_store() -> CredentialStore {
        CredentialStore::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_save_and_load() {
        let store = test_store();
        let expires_at = Utc::now() + Duration::hours(1);

        store.save("tok1", "ref1", expires_at).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "tok1");
        assert_eq!(loaded.refresh_token, "ref1");
        // RFC 3339 round-trip keeps sub-second precision
        assert_eq!(loaded.expires_at.to_rfc3339(), expires_at.to_rfc3339());
    }

    #[test]
    fn test_empty_slot_loads_as_none() {
        let store = test_store();
        assert!(store.load().unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_partial_slot_loads_as_none() {
        let store = test_store();
        store.set(ACCESS_TOKEN_KEY, "tok1").unwrap();
        store.set(REFRESH_TOKEN_KEY, "ref1").unwrap();
        // No expiry written

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_malformed_expiry_loads_as_none() {
        let store = test_store();
        store.set(ACCESS_TOKEN_KEY, "tok1").unwrap();
        store.set(REFRESH_TOKEN_KEY, "ref1").unwrap();
        store.set(EXPIRES_AT_KEY, "not-a-timestamp").unwrap();

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_previous_slot() {
        let store = test_store();
        let first = Utc::now() + Duration::hours(1);
        let second = Utc::now() + Duration::hours(2);

        store.save("tok1", "ref1", first).unwrap();
        store.save("tok2", "ref2", second).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "tok2");
        assert_eq!(loaded.refresh_token, "ref2");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = test_store();
        store
            .save("tok1", "ref1", Utc::now() + Duration::hours(1))
            .unwrap();

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());

        // Clearing an already-empty slot is fine
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
    }
}
