//! Command handlers for the CredHub CLI

pub mod api;
pub mod auth;
pub mod credentials;
pub mod permissions;
pub mod version;
