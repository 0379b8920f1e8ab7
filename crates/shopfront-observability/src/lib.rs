//! Logging setup for Shopfront binaries.
//!
//! Library crates only emit `tracing` events. Binaries call
//! [`init_logging`] once at startup to decide where they go and how they
//! look.

mod logging;

pub use logging::*;
