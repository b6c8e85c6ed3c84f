//! Application-level utilities for the Userpass CLI.
//!
//! This module provides:
//! - Path resolution for config, store directory and sources
//! - The session vault with terminal prompt and keychain agent

mod context;
mod passphrase;
mod resolver;

// Re-export public API
pub use context::{AppContext, SessionVault};
