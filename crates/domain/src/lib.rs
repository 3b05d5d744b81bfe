//! Shared domain types for PulseBot.
//!
//! This is the leaf crate of the workspace: configuration, the error
//! taxonomy, the content model (knowledge entries, news, pages, runtime
//! settings), and the integrity stamper. It performs no I/O beyond serde.

pub mod config;
pub mod error;
pub mod model;
pub mod stamp;

pub use config::Config;
pub use error::{Error, Result};
