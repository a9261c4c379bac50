//! Fixture variants.
//!
//! Every variant exposes the same surface: render the login form, handle a
//! submitted pair. Where the submission is handled differs:
//! - `server_session`: on the server, session cookie, redirect on success
//! - `client_only`: in the page script, no network round-trip
//! - `static_install`: nowhere, the page is a decoy

use std::sync::Arc;

use axum::Router;

use credfix_common::{CredentialPair, CredentialRule, Error, FixtureDescriptor, Result, VariantKind};

use crate::auth::SessionRecord;

pub mod client_only;
pub mod server_session;
pub mod static_install;

pub use client_only::{ClientOnlyLogin, HashRouter, LoginPage, PageState};
pub use server_session::ServerSessionLogin;
pub use static_install::StaticInstallPage;

/// Generic failure text. Never says which field was wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials.";

/// Result of handling one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Server variant success: redirect, session created.
    Redirect { location: String, session: SessionRecord },
    /// Server variant failure: form re-rendered with this message.
    Rejected { message: &'static str },
    /// Client variant success: alert-style acknowledgment.
    Acknowledged { text: String },
    /// Client variant failure: error element made visible.
    ErrorShown,
    /// Static variant: nothing happens.
    Ignored,
}

impl Outcome {
    /// Whether a scanner would observe an authenticated signal.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Outcome::Redirect { .. } | Outcome::Acknowledged { .. })
    }
}

/// One login surface
pub trait FixtureVariant: Send + Sync {
    fn descriptor(&self) -> &FixtureDescriptor;

    /// Markup served for `GET /`; `error` is shown inline when present.
    fn render_login_form(&self, error: Option<&str>) -> String;

    /// Decide a submission. Never fails: malformed input is a failed check.
    fn handle_submit(&self, submitted: &CredentialPair) -> Outcome;

    /// HTTP routes for this variant.
    fn into_router(self: Arc<Self>) -> Router;
}

/// Build the variant a descriptor names.
pub fn build(
    descriptor: FixtureDescriptor,
    session_ttl_secs: i64,
) -> Result<Arc<dyn FixtureVariant>> {
    Ok(match descriptor.variant_kind() {
        VariantKind::ServerSessionLogin => {
            Arc::new(ServerSessionLogin::new(descriptor, session_ttl_secs)?)
        }
        VariantKind::ClientOnlyLogin => Arc::new(ClientOnlyLogin::new(descriptor)?),
        VariantKind::StaticInstallPage => Arc::new(StaticInstallPage::new(descriptor)?),
    })
}

/// Pull the rule out of a descriptor that must carry one.
fn require_rule(descriptor: &FixtureDescriptor, kind: VariantKind) -> Result<CredentialRule> {
    if descriptor.variant_kind() != kind {
        return Err(Error::InvalidConfig(format!(
            "fixture {} is {}, not {}",
            descriptor.name(),
            descriptor.variant_kind(),
            kind
        )));
    }
    descriptor.rule().cloned().ok_or_else(|| {
        Error::InvalidConfig(format!("fixture {} has no credential rule", descriptor.name()))
    })
}
