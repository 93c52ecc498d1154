//! Session data structure

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated session: one slot per client context.
///
/// All three fields are written together from a signin or refresh
/// response; there is no partially-populated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer credential attached to protected requests
    pub access_token: String,
    /// Longer-lived credential exchanged only for a new access token
    pub refresh_token: String,
    /// Absolute expiry of the access token
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True when the access token expires within `lead` of `now`.
    pub fn renewal_imminent_at(&self, now: DateTime<Utc>, lead: Duration) -> bool {
        self.expires_at <= now + lead
    }

    /// Delay until a proactive refresh should fire (`expires_at - now -
    /// lead`), or `None` when that point is already in the past and a
    /// refresh is owed immediately.
    pub fn refresh_delay(&self, now: DateTime<Utc>, lead: Duration) -> Option<std::time::Duration> {
        let delta = self.expires_at - now - lead;
        if delta <= Duration::zero() {
            return None;
        }
        delta.to_std().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_expiring_in(minutes: i64) -> (Session, DateTime<Utc>) {
        let now = Utc::now();
        let session = Session::new(
            "tok1".to_string(),
            "ref1".to_string(),
            now + Duration::minutes(minutes),
        );
        (session, now)
    }

    #[test]
    fn test_expiry() {
        let (session, now) = session_expiring_in(10);
        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::minutes(10)));
        assert!(session.is_expired_at(now + Duration::minutes(11)));
    }

    #[test]
    fn test_renewal_imminent_within_lead() {
        let lead = Duration::minutes(5);

        let (session, now) = session_expiring_in(4);
        assert!(session.renewal_imminent_at(now, lead));

        let (session, now) = session_expiring_in(6);
        assert!(!session.renewal_imminent_at(now, lead));

        // Exactly at the boundary counts as imminent
        let (session, now) = session_expiring_in(5);
        assert!(session.renewal_imminent_at(now, lead));
    }

    #[test]
    fn test_refresh_delay() {
        let lead = Duration::minutes(5);

        let (session, now) = session_expiring_in(30);
        let delay = session.refresh_delay(now, lead).unwrap();
        assert_eq!(delay, std::time::Duration::from_secs(25 * 60));

        // Inside the lead window: refresh owed now, nothing to schedule
        let (session, now) = session_expiring_in(4);
        assert!(session.refresh_delay(now, lead).is_none());

        // Already expired
        let (session, now) = session_expiring_in(-1);
        assert!(session.refresh_delay(now, lead).is_none());
    }
}
