//! Session state for the server-side login fixture.
//!
//! - `gate`: the ANONYMOUS/AUTHENTICATED state machine
//! - `cookie`: carrying the session token between requests
//! - `types`: session records and gate states

pub mod cookie;
pub mod gate;
pub mod types;

pub use cookie::SESSION_COOKIE;
pub use gate::SessionGate;
pub use types::*;
