//! Credfix Fixture Server
//!
//! Serves deliberately weak login surfaces for scoring credential scanners.

pub mod auth;
pub mod html;
pub mod server;
pub mod static_files;
pub mod variant;

pub use auth::{GateState, SessionGate, SessionRecord};
pub use server::{serve_fixture_set, FixtureServer, ServeError};
pub use variant::{FixtureVariant, Outcome};
