//! Credfix Common Library
//!
//! Credential rule, fixture descriptors, configuration and the theme
//! preference store shared by the fixture server.

pub mod config;
pub mod credential;
pub mod error;
pub mod theme;
pub mod types;

pub use config::{validate_session_ttl, FixtureEntry, FixtureSetConfig};
pub use credential::{evaluate, CredentialPair, CredentialRule};
pub use error::{Error, Result};
pub use theme::{Theme, ThemeStore, ThemeView};
pub use types::*;

/// Credfix version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default config path, overridable with `CREDFIX_CONFIG`
pub fn default_config_path() -> std::path::PathBuf {
    std::env::var_os("CREDFIX_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from("credfix.toml"))
}
