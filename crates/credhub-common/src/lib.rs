//! # CredHub Common
//!
//! Pieces shared by the CredHub SDK and CLI crates:
//! - Logging initialisation driven by `-v/-q` flags and `RUST_LOG`
//! - The configuration error type surfaced by config loaders

pub mod error;
pub mod logging;

pub use error::ConfigurationError;
