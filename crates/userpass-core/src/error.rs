//! Error types for Userpass core operations.
//!
//! Every variant is raised before any persisted state is touched, so callers
//! can report it and carry on. The CLI layer maps these to exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Userpass operations.
pub type Result<T> = std::result::Result<T, UserpassError>;

/// Core error type for Userpass operations.
#[derive(Debug, Error)]
pub enum UserpassError {
    /// A named source file does not exist
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The vault could not decrypt a source within its retry budget
    #[error("Decryption failed for {} after {attempts} attempt(s)", .path.display())]
    DecryptionFailed { path: PathBuf, attempts: u32 },

    /// `save` has no single source to write back to
    #[error("Can't save back to {sources} sources; pass an explicit target from a single-source store")]
    AmbiguousTarget { sources: usize },

    /// The vault produced no output for a save
    #[error("Encryption produced no output for {}; original left untouched", .0.display())]
    EncryptionFailed(PathBuf),

    /// A query matched no key
    #[error("No key matches '{0}'")]
    NoMatch(String),

    /// A query matched several keys where exactly one was required
    #[error("'{pattern}' matches {} keys: {}", .candidates.len(), .candidates.join(", "))]
    AmbiguousMatch {
        pattern: String,
        candidates: Vec<String>,
    },

    /// Passphrase did not unlock the file
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// Encryption or decryption error other than a wrong passphrase
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Filesystem error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for UserpassError {
    fn from(err: std::io::Error) -> Self {
        UserpassError::Storage(err.to_string())
    }
}
