//! Session authentication for PulseBot.
//!
//! Implements the single-admin bearer-token model: one credential
//! principal, a process-wide in-memory session registry keyed by opaque
//! 256-bit tokens, 24-hour session lifetime, lazy eviction on validation
//! plus an hourly sweep driven by the gateway. State resets on restart —
//! session persistence is an explicit non-goal.

pub mod credentials;
pub mod registry;

pub use credentials::{hash_password, AdminCredentials};
pub use registry::{Session, SessionRegistry, SESSION_TTL_HOURS};
