//! Core types for the session gate.

use serde::Serialize;

/// Opaque session token carried in the session cookie
pub type SessionToken = String;

/// Server-held record marking one simulated client as authenticated.
///
/// Only the gate constructs these, so `logged_in` never appears without
/// the username that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    session_id: SessionToken,
    logged_in: bool,
    username: String,
    created_at: i64,
    expires_at: i64,
}

impl SessionRecord {
    pub(crate) fn authenticated(
        session_id: SessionToken,
        username: String,
        created_at: i64,
        expires_at: i64,
    ) -> Self {
        Self {
            session_id,
            logged_in: true,
            username,
            created_at,
            expires_at,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Gate state as seen by one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Anonymous,
    Authenticated { username: String },
}

/// Why a session left the AUTHENTICATED state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    Logout,
    Expired,
}
