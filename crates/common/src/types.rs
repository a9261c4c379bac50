//! Core types for credfix fixtures

use serde::{Deserialize, Serialize};

use crate::credential::{CredentialPair, CredentialRule};
use crate::error::{Error, Result};

/// Default path a successful server-side login redirects to.
pub const DEFAULT_PROTECTED_PATH: &str = "/dashboard.php";

/// Default acknowledgment shown by the client-only page.
pub const DEFAULT_ALERT_TEXT: &str = "Logged in successfully";

/// Which login surface a fixture exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantKind {
    /// Form handled on the server, session cookie, redirect on success.
    ServerSessionLogin,
    /// Form handled by page script, no network round-trip.
    ClientOnlyLogin,
    /// Installer page decoy with no credential check at all.
    StaticInstallPage,
}

impl VariantKind {
    /// Whether submissions to this variant are ever checked.
    pub fn checks_credentials(self) -> bool {
        !matches!(self, VariantKind::StaticInstallPage)
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariantKind::ServerSessionLogin => write!(f, "server-session-login"),
            VariantKind::ClientOnlyLogin => write!(f, "client-only-login"),
            VariantKind::StaticInstallPage => write!(f, "static-install-page"),
        }
    }
}

impl std::str::FromStr for VariantKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "server-session-login" => Ok(VariantKind::ServerSessionLogin),
            "client-only-login" => Ok(VariantKind::ClientOnlyLogin),
            "static-install-page" => Ok(VariantKind::StaticInstallPage),
            other => Err(Error::InvalidConfig(format!("unknown variant kind: {}", other))),
        }
    }
}

/// What a scanner observes when a login succeeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuccessSignal {
    /// HTTP redirect to a protected path.
    Redirect { location: String },
    /// Alert-style acknowledgment raised by the page.
    Alert { text: String },
    /// Never signals success.
    None,
}

impl SuccessSignal {
    fn default_for(kind: VariantKind) -> Self {
        match kind {
            VariantKind::ServerSessionLogin => SuccessSignal::Redirect {
                location: DEFAULT_PROTECTED_PATH.to_string(),
            },
            VariantKind::ClientOnlyLogin => SuccessSignal::Alert {
                text: DEFAULT_ALERT_TEXT.to_string(),
            },
            VariantKind::StaticInstallPage => SuccessSignal::None,
        }
    }

    fn fits(&self, kind: VariantKind) -> bool {
        matches!(
            (self, kind),
            (SuccessSignal::Redirect { .. }, VariantKind::ServerSessionLogin)
                | (SuccessSignal::Alert { .. }, VariantKind::ClientOnlyLogin)
                | (SuccessSignal::None, VariantKind::StaticInstallPage)
        )
    }
}

/// Static description of one fixture instance.
///
/// Immutable once built; construct with [`FixtureDescriptor::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureDescriptor {
    name: String,
    variant_kind: VariantKind,
    rule: Option<CredentialRule>,
    success_signal: SuccessSignal,
}

impl FixtureDescriptor {
    pub fn builder(name: impl Into<String>, variant_kind: VariantKind) -> FixtureDescriptorBuilder {
        FixtureDescriptorBuilder {
            name: name.into(),
            variant_kind,
            expected: None,
            success_signal: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant_kind(&self) -> VariantKind {
        self.variant_kind
    }

    /// The credential rule; `None` only for the static decoy.
    pub fn rule(&self) -> Option<&CredentialRule> {
        self.rule.as_ref()
    }

    pub fn success_signal(&self) -> &SuccessSignal {
        &self.success_signal
    }

    /// Redirect target for the server variant.
    pub fn protected_path(&self) -> Option<&str> {
        match &self.success_signal {
            SuccessSignal::Redirect { location } => Some(location.as_str()),
            _ => None,
        }
    }
}

/// Builder for [`FixtureDescriptor`]
#[derive(Debug, Clone)]
pub struct FixtureDescriptorBuilder {
    name: String,
    variant_kind: VariantKind,
    expected: Option<CredentialPair>,
    success_signal: Option<SuccessSignal>,
}

impl FixtureDescriptorBuilder {
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.expected = Some(CredentialPair::new(username, password));
        self
    }

    pub fn success_signal(mut self, signal: SuccessSignal) -> Self {
        self.success_signal = Some(signal);
        self
    }

    pub fn redirect_to(self, location: impl Into<String>) -> Self {
        self.success_signal(SuccessSignal::Redirect {
            location: location.into(),
        })
    }

    pub fn alert_text(self, text: impl Into<String>) -> Self {
        self.success_signal(SuccessSignal::Alert { text: text.into() })
    }

    pub fn build(self) -> Result<FixtureDescriptor> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig("fixture name must not be empty".to_string()));
        }

        let success_signal = self
            .success_signal
            .unwrap_or_else(|| SuccessSignal::default_for(self.variant_kind));
        if !success_signal.fits(self.variant_kind) {
            return Err(Error::InvalidConfig(format!(
                "fixture {}: success signal {:?} does not fit variant {}",
                self.name, success_signal, self.variant_kind
            )));
        }
        if let SuccessSignal::Redirect { location } = &success_signal {
            if !location.starts_with('/') || location == "/" {
                return Err(Error::InvalidConfig(format!(
                    "fixture {}: redirect target must be an absolute path other than /",
                    self.name
                )));
            }
        }

        let rule = match (self.variant_kind.checks_credentials(), self.expected) {
            (true, Some(pair)) => Some(CredentialRule::new(pair)),
            (true, None) => {
                return Err(Error::InvalidConfig(format!(
                    "fixture {}: {} requires expected credentials",
                    self.name, self.variant_kind
                )))
            }
            (false, Some(_)) => {
                return Err(Error::InvalidConfig(format!(
                    "fixture {}: {} takes no credentials",
                    self.name, self.variant_kind
                )))
            }
            (false, None) => None,
        };

        Ok(FixtureDescriptor {
            name: self.name,
            variant_kind: self.variant_kind,
            rule,
            success_signal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults_to_dashboard_redirect() {
        let d = FixtureDescriptor::builder("php", VariantKind::ServerSessionLogin)
            .credentials("admin", "admin")
            .build()
            .unwrap();
        assert_eq!(d.protected_path(), Some(DEFAULT_PROTECTED_PATH));
        assert!(d.rule().unwrap().evaluate(&CredentialPair::new("admin", "admin")));
    }

    #[test]
    fn test_client_defaults_to_alert() {
        let d = FixtureDescriptor::builder("spa", VariantKind::ClientOnlyLogin)
            .credentials("admin", "admin1")
            .build()
            .unwrap();
        assert_eq!(
            d.success_signal(),
            &SuccessSignal::Alert { text: DEFAULT_ALERT_TEXT.to_string() }
        );
        assert_eq!(d.protected_path(), None);
    }

    #[test]
    fn test_static_rejects_credentials() {
        let err = FixtureDescriptor::builder("wp", VariantKind::StaticInstallPage)
            .credentials("admin", "admin")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let d = FixtureDescriptor::builder("wp", VariantKind::StaticInstallPage)
            .build()
            .unwrap();
        assert!(d.rule().is_none());
        assert_eq!(d.success_signal(), &SuccessSignal::None);
    }

    #[test]
    fn test_login_variants_require_credentials() {
        let err = FixtureDescriptor::builder("php", VariantKind::ServerSessionLogin)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_mismatched_signal_rejected() {
        let err = FixtureDescriptor::builder("spa", VariantKind::ClientOnlyLogin)
            .credentials("admin", "admin1")
            .redirect_to("/home")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_redirect_must_leave_login_path() {
        let err = FixtureDescriptor::builder("php", VariantKind::ServerSessionLogin)
            .credentials("admin", "admin")
            .redirect_to("/")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_variant_kind_round_trips_through_str() {
        for kind in [
            VariantKind::ServerSessionLogin,
            VariantKind::ClientOnlyLogin,
            VariantKind::StaticInstallPage,
        ] {
            assert_eq!(kind.to_string().parse::<VariantKind>().unwrap(), kind);
        }
        assert!("ldap".parse::<VariantKind>().is_err());
    }
}
