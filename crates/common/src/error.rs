//! Error types for credfix

use thiserror::Error;

/// Result type alias using the credfix Error
pub type Result<T> = std::result::Result<T, Error>;

/// Credfix error types
#[derive(Error, Debug)]
pub enum Error {
    /// A submitted credential pair did not match the fixture's expected pair.
    ///
    /// The message is deliberately generic: it never says which field was wrong.
    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Fixture already exists: {kind} {id}")]
    AlreadyExists { kind: String, id: String },

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
}
