//! # CredHub CLI
//!
//! Command-line interface for a CredHub credential server.
//!
//! ## Architecture
//!
//! - Clap-based argument parsing with derive macros
//! - Handler-based command processing
//! - Configuration loaded once per command and passed to the SDK as a snapshot
//! - Token pair written back after each command

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod output;

pub use cli::*;
pub use error::*;
