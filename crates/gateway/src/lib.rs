//! PulseBot gateway — the HTTP surface and the answer-resolution runtime.

pub mod analytics;
pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod resolver;
pub mod state;
pub mod store;
