//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Nothing matched (key, source).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase, too many attempts).
    pub const AUTH_FAILED: i32 = 5;

    /// A query matched several keys, or a save had no single target.
    pub const AMBIGUOUS: i32 = 6;
}

/// Environment variable holding a passphrase for non-interactive use.
pub const PASSPHRASE_ENV: &str = "USERPASS_PASSPHRASE";

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "USERPASS_CONFIG";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "USERPASS_LOG";

/// Keychain service name for the credential agent.
pub const KEYCHAIN_SERVICE: &str = "userpass";
