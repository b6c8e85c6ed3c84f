//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI. Core errors keep their
//! own type through `anyhow` and are mapped here when the process exits.

use std::fmt;

use userpass_core::UserpassError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Nothing matched (key, source)
    NotFound { message: String, hint: String },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => write!(f, "{}\n{}", message, hint),
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }
}

/// Exit code for an error escaping `run`.
///
/// Typed errors keep their code; everything else exits with 1.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    match err.downcast_ref::<UserpassError>() {
        Some(UserpassError::SourceNotFound(_)) | Some(UserpassError::NoMatch(_)) => {
            exit_codes::NOT_FOUND
        }
        Some(UserpassError::DecryptionFailed { .. }) | Some(UserpassError::IncorrectPassphrase) => {
            exit_codes::AUTH_FAILED
        }
        Some(UserpassError::AmbiguousMatch { .. }) | Some(UserpassError::AmbiguousTarget { .. }) => {
            exit_codes::AMBIGUOUS
        }
        Some(UserpassError::InvalidInput(_)) => exit_codes::INVALID_INPUT,
        _ => 1,
    }
}

/// A follow-up hint for core errors, printed under the message.
pub fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<UserpassError>()? {
        UserpassError::SourceNotFound(_) => {
            Some("Hint: Run `userpass sources` to see the files that were found.")
        }
        UserpassError::NoMatch(_) => Some("Hint: Run `userpass list` to see all keys."),
        UserpassError::DecryptionFailed { .. } | UserpassError::IncorrectPassphrase => Some(
            "Hint: Every host file must open with the same passphrase.\n      Set USERPASS_PASSPHRASE for non-interactive use.",
        ),
        UserpassError::AmbiguousMatch { .. } => Some("Hint: Narrow the pattern or pass --exact."),
        UserpassError::AmbiguousTarget { .. } => {
            Some("Hint: Writes go to a single host file; check --host.")
        }
        UserpassError::EncryptionFailed(_) => {
            Some("Hint: The previous file was kept; nothing was lost.")
        }
        _ => None,
    }
}
