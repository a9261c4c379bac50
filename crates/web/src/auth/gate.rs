//! Session gate for the server-side login fixture.
//!
//! ANONYMOUS means "no live record for this token". Records are keyed by
//! their own token in a sharded map, so unrelated sessions never contend
//! on one lock.

use dashmap::DashMap;
use tracing::debug;

use credfix_common::{CredentialPair, CredentialRule, Result};

use super::types::{GateState, SessionEnd, SessionRecord, SessionToken};

fn now_epoch_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Tracks which simulated clients are authenticated
#[derive(Debug)]
pub struct SessionGate {
    sessions: DashMap<SessionToken, SessionRecord>,
    ttl_secs: i64,
}

impl SessionGate {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// ANONYMOUS -> AUTHENTICATED on a passing check.
    ///
    /// A failing check returns `InvalidCredentials` and leaves the map untouched.
    /// A passing one first drops every record already expired at `now`, so
    /// sessions whose cookie is never presented again do not pile up.
    pub fn login(&self, rule: &CredentialRule, submitted: &CredentialPair) -> Result<SessionRecord> {
        self.login_at(rule, submitted, now_epoch_secs())
    }

    pub fn login_at(
        &self,
        rule: &CredentialRule,
        submitted: &CredentialPair,
        now: i64,
    ) -> Result<SessionRecord> {
        rule.check(submitted)?;
        self.purge_expired_at(now);

        let token = uuid::Uuid::new_v4().simple().to_string();
        let record = SessionRecord::authenticated(
            token.clone(),
            submitted.username.clone(),
            now,
            now.saturating_add(self.ttl_secs),
        );
        self.sessions.insert(token, record.clone());
        Ok(record)
    }

    /// Live record for a token; an expired record is dropped on sight.
    pub fn lookup(&self, token: &str) -> Option<SessionRecord> {
        self.lookup_at(token, now_epoch_secs())
    }

    pub fn lookup_at(&self, token: &str, now: i64) -> Option<SessionRecord> {
        let record = self.sessions.get(token).map(|r| r.value().clone())?;
        if record.is_expired_at(now) {
            self.end(token, SessionEnd::Expired);
            return None;
        }
        Some(record)
    }

    pub fn state(&self, token: Option<&str>) -> GateState {
        self.state_at(token, now_epoch_secs())
    }

    pub fn state_at(&self, token: Option<&str>, now: i64) -> GateState {
        match token.and_then(|t| self.lookup_at(t, now)) {
            Some(record) => GateState::Authenticated {
                username: record.username().to_string(),
            },
            None => GateState::Anonymous,
        }
    }

    /// AUTHENTICATED -> ANONYMOUS. Returns false if the token was not live.
    pub fn logout(&self, token: &str) -> bool {
        self.end(token, SessionEnd::Logout)
    }

    /// Drop every record that has expired by `now`.
    pub fn purge_expired_at(&self, now: i64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, record| !record.is_expired_at(now));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn end(&self, token: &str, reason: SessionEnd) -> bool {
        match self.sessions.remove(token) {
            Some((_, record)) => {
                debug!(username = %record.username(), ?reason, "Session ended");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credfix_common::Error;

    fn rule() -> CredentialRule {
        CredentialRule::new(CredentialPair::new("admin", "admin"))
    }

    #[test]
    fn test_login_creates_authenticated_record() {
        let gate = SessionGate::new(60);
        let record = gate.login(&rule(), &CredentialPair::new("admin", "admin")).unwrap();
        assert!(record.logged_in());
        assert_eq!(record.username(), "admin");
        assert_eq!(record.expires_at() - record.created_at(), 60);
        assert_eq!(gate.len(), 1);
        assert_eq!(
            gate.state(Some(record.session_id())),
            GateState::Authenticated { username: "admin".to_string() }
        );
    }

    #[test]
    fn test_failed_login_leaves_gate_untouched() {
        let gate = SessionGate::new(60);
        let err = gate.login(&rule(), &CredentialPair::new("admin", "wrong")).unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
        assert!(gate.is_empty());
    }

    #[test]
    fn test_tokens_are_unique_per_login() {
        let gate = SessionGate::new(60);
        let a = gate.login(&rule(), &CredentialPair::new("admin", "admin")).unwrap();
        let b = gate.login(&rule(), &CredentialPair::new("admin", "admin")).unwrap();
        assert_ne!(a.session_id(), b.session_id());
        assert_eq!(gate.len(), 2);
    }

    #[test]
    fn test_logout_returns_to_anonymous() {
        let gate = SessionGate::new(60);
        let record = gate.login(&rule(), &CredentialPair::new("admin", "admin")).unwrap();
        assert!(gate.logout(record.session_id()));
        assert!(!gate.logout(record.session_id()));
        assert_eq!(gate.state(Some(record.session_id())), GateState::Anonymous);
    }

    #[test]
    fn test_expired_session_is_anonymous_and_removed() {
        let gate = SessionGate::new(10);
        let record = gate
            .login_at(&rule(), &CredentialPair::new("admin", "admin"), 1_000)
            .unwrap();
        assert!(gate.lookup_at(record.session_id(), 1_009).is_some());
        assert!(gate.lookup_at(record.session_id(), 1_010).is_none());
        assert!(gate.is_empty());
    }

    #[test]
    fn test_purge_expired_keeps_live_sessions() {
        let gate = SessionGate::new(10);
        let pair = CredentialPair::new("admin", "admin");
        gate.login_at(&rule(), &pair, 1_000).unwrap();
        let live = gate.login_at(&rule(), &pair, 1_005).unwrap();
        assert_eq!(gate.purge_expired_at(1_012), 1);
        assert_eq!(gate.len(), 1);
        assert!(gate.lookup_at(live.session_id(), 1_012).is_some());
    }

    #[test]
    fn test_login_drops_abandoned_expired_sessions() {
        let gate = SessionGate::new(10);
        let pair = CredentialPair::new("admin", "admin");
        for t in 0..5 {
            gate.login_at(&rule(), &pair, 1_000 + t).unwrap();
        }
        assert_eq!(gate.len(), 5);

        let fresh = gate.login_at(&rule(), &pair, 2_000).unwrap();
        assert_eq!(gate.len(), 1);
        assert!(gate.lookup_at(fresh.session_id(), 2_000).is_some());
    }

    #[test]
    fn test_failed_login_does_not_purge() {
        let gate = SessionGate::new(10);
        gate.login_at(&rule(), &CredentialPair::new("admin", "admin"), 1_000).unwrap();
        assert!(gate
            .login_at(&rule(), &CredentialPair::new("admin", "nope"), 2_000)
            .is_err());
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_overflowing() {
        let gate = SessionGate::new(i64::MAX);
        let record = gate
            .login_at(&rule(), &CredentialPair::new("admin", "admin"), 1_000)
            .unwrap();
        assert_eq!(record.expires_at(), i64::MAX);
        assert!(gate.lookup_at(record.session_id(), 1_001).is_some());
    }

    #[test]
    fn test_unknown_token_is_anonymous() {
        let gate = SessionGate::new(60);
        assert_eq!(gate.state(Some("nope")), GateState::Anonymous);
        assert_eq!(gate.state(None), GateState::Anonymous);
    }
}
