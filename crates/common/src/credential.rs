//! Credential pairs and the intentionally weak rule that checks them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A username/password tuple as submitted by a test client.
///
/// Missing fields deserialize to empty strings so that a malformed
/// submission is just another failing pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialPair {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Exact, case-sensitive comparison of both fields.
///
/// Plain `==` on purpose: the fixtures must stay brute-forceable, so there is
/// no constant-time comparison and no normalization of any kind.
pub fn evaluate(submitted: &CredentialPair, expected: &CredentialPair) -> bool {
    submitted.username == expected.username && submitted.password == expected.password
}

/// The expected pair of a fixture, injected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRule {
    expected: CredentialPair,
}

impl CredentialRule {
    pub fn new(expected: CredentialPair) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> &CredentialPair {
        &self.expected
    }

    pub fn evaluate(&self, submitted: &CredentialPair) -> bool {
        evaluate(submitted, &self.expected)
    }

    /// Same check, shaped as a `Result` for callers that propagate.
    pub fn check(&self, submitted: &CredentialPair) -> Result<()> {
        if self.evaluate(submitted) {
            Ok(())
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}
