//! # Userpass Core
//!
//! Core library for Userpass - a personal credential store kept in one
//! encrypted file per host and merged on read.
//!
//! This crate provides the record model, the line codec, the multi-source
//! store and its resolution rules, independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **record**: The timestamped `(key, username, secret)` fact
//! - **codec**: Tab-separated plaintext format of a source file
//! - **store**: Multi-source in-memory store (load, add, query, save)
//! - **resolve**: Which records are shown by default
//! - **vault**: Decrypt/encrypt collaborator with passphrase retry
//! - **source**: Per-host file naming and discovery

pub mod codec;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod generate;
pub mod record;
pub mod resolve;
pub mod source;
pub mod store;
pub mod vault;

pub use error::{Result, UserpassError};
pub use record::Record;
pub use resolve::Resolution;
pub use store::{KeyPattern, Store};
pub use vault::{AgeVault, CredentialAgent, CredentialCache, DecryptOptions, PassphrasePrompt, Vault};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
