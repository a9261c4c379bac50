//! Fixture set configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{FixtureDescriptor, VariantKind};

/// Default session lifetime (12 hours)
pub const DEFAULT_SESSION_TTL_SECS: i64 = 12 * 60 * 60;

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Session TTL must lie in `1..=MAX_SESSION_TTL_SECS`.
pub fn validate_session_ttl(secs: i64) -> Result<()> {
    if secs <= 0 || secs > MAX_SESSION_TTL_SECS {
        return Err(Error::InvalidConfig(format!(
            "session_ttl_secs must be between 1 and {}, got {}",
            MAX_SESSION_TTL_SECS, secs
        )));
    }
    Ok(())
}

/// Top-level configuration: every fixture served in one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSetConfig {
    /// Session TTL for server-session fixtures
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,

    /// Where the theme preference is persisted (in-memory only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_file: Option<PathBuf>,

    /// Fixtures, each on its own listener
    #[serde(default)]
    pub fixtures: Vec<FixtureEntry>,
}

fn default_session_ttl() -> i64 {
    DEFAULT_SESSION_TTL_SECS
}

/// One `[[fixtures]]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureEntry {
    pub name: String,
    pub variant: VariantKind,
    pub bind: SocketAddr,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Server variant: protected path to redirect to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    /// Client variant: acknowledgment text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_text: Option<String>,
}

impl FixtureEntry {
    /// Build the immutable descriptor for this entry.
    pub fn descriptor(&self) -> Result<FixtureDescriptor> {
        let mut builder = FixtureDescriptor::builder(&self.name, self.variant);

        // A username alone still configures a pair; the missing half is empty.
        if self.username.is_some() || self.password.is_some() {
            builder = builder.credentials(
                self.username.clone().unwrap_or_default(),
                self.password.clone().unwrap_or_default(),
            );
        }
        if let Some(location) = &self.redirect_to {
            builder = builder.redirect_to(location);
        }
        if let Some(text) = &self.alert_text {
            builder = builder.alert_text(text);
        }

        builder.build()
    }
}

impl Default for FixtureSetConfig {
    /// The three stock fixtures; admin/admin and admin/admin1 stay separate.
    fn default() -> Self {
        Self {
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            theme_file: None,
            fixtures: vec![
                FixtureEntry {
                    name: "php-easy-admin-password".to_string(),
                    variant: VariantKind::ServerSessionLogin,
                    bind: SocketAddr::from(([127, 0, 0, 1], 8081)),
                    username: Some("admin".to_string()),
                    password: Some("admin".to_string()),
                    redirect_to: None,
                    alert_text: None,
                },
                FixtureEntry {
                    name: "single-page-app-easy-password".to_string(),
                    variant: VariantKind::ClientOnlyLogin,
                    bind: SocketAddr::from(([127, 0, 0, 1], 8082)),
                    username: Some("admin".to_string()),
                    password: Some("admin1".to_string()),
                    redirect_to: None,
                    alert_text: None,
                },
                FixtureEntry {
                    name: "wp-install-decoy".to_string(),
                    variant: VariantKind::StaticInstallPage,
                    bind: SocketAddr::from(([127, 0, 0, 1], 8083)),
                    username: None,
                    password: None,
                    redirect_to: None,
                    alert_text: None,
                },
            ],
        }
    }
}

impl FixtureSetConfig {
    /// Load configuration from file, or defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate and resolve every fixture into `(bind, descriptor)`.
    pub fn resolve(&self) -> Result<Vec<(SocketAddr, FixtureDescriptor)>> {
        validate_session_ttl(self.session_ttl_secs)?;

        let mut names = HashSet::new();
        let mut binds = HashSet::new();
        let mut resolved = Vec::with_capacity(self.fixtures.len());

        for entry in &self.fixtures {
            if !names.insert(entry.name.as_str()) {
                return Err(Error::AlreadyExists {
                    kind: "fixture".to_string(),
                    id: entry.name.clone(),
                });
            }
            // Port 0 asks the OS for a free port, so it may repeat.
            if entry.bind.port() != 0 && !binds.insert(entry.bind) {
                return Err(Error::AlreadyExists {
                    kind: "bind address".to_string(),
                    id: entry.bind.to_string(),
                });
            }
            resolved.push((entry.bind, entry.descriptor()?));
        }

        Ok(resolved)
    }
}
