//! Passphrase sources for the vault: terminal prompt and platform keychain.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use dialoguer::Password;
use userpass_core::vault::PromptRequest;
use userpass_core::{CredentialAgent, PassphrasePrompt, UserpassError};

use crate::constants::{KEYCHAIN_SERVICE, PASSPHRASE_ENV};

/// Prompts on the terminal, or reads USERPASS_PASSPHRASE once per source.
pub struct TerminalPrompt {
    interactive: bool,
}

impl TerminalPrompt {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }
}

impl PassphrasePrompt for TerminalPrompt {
    fn prompt(&mut self, request: &PromptRequest) -> userpass_core::Result<Option<SecretString>> {
        if let Ok(value) = std::env::var(PASSPHRASE_ENV) {
            if !value.trim().is_empty() {
                // The environment offers one answer; retrying it is pointless.
                return Ok((request.attempt == 1).then(|| SecretString::from(value)));
            }
        }
        if !self.interactive {
            return Err(UserpassError::InvalidInput(format!(
                "No passphrase provided and no TTY available. Set {}.",
                PASSPHRASE_ENV
            )));
        }

        if request.attempt > 1 {
            let remaining = request.max_attempts + 1 - request.attempt;
            eprintln!(
                "Incorrect passphrase. {} attempt{} remaining.",
                remaining,
                if remaining == 1 { "" } else { "s" }
            );
        }

        let name = request
            .source
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| request.source.display().to_string());
        let mut password = Password::new();
        if request.confirm {
            password = password
                .with_prompt(format!("New passphrase for {}", name))
                .with_confirmation("Confirm passphrase", "Passphrases do not match");
        } else {
            password = password.with_prompt(format!("Passphrase for {}", name));
        }
        let value = password
            .interact()
            .map_err(|e| UserpassError::InvalidInput(format!("Failed to read passphrase: {}", e)))?;
        Ok(Some(SecretString::from(value)))
    }
}

/// Credential agent backed by the platform keychain.
///
/// One keychain entry per store directory; every host file in a directory
/// shares the passphrase.
pub struct KeychainAgent {
    account: String,
}

impl KeychainAgent {
    pub fn for_dir(dir: &Path) -> Self {
        Self {
            account: dir_hash(dir),
        }
    }

    fn entry(&self) -> Option<keyring::Entry> {
        match keyring::Entry::new(KEYCHAIN_SERVICE, &self.account) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "keychain unavailable");
                None
            }
        }
    }
}

impl CredentialAgent for KeychainAgent {
    fn lookup(&self, _source: &Path) -> Option<SecretString> {
        match self.entry()?.get_password() {
            Ok(value) => Some(SecretString::from(value)),
            Err(keyring::Error::NoEntry) => None,
            Err(err) => {
                tracing::warn!(error = %err, "keychain read failed");
                None
            }
        }
    }

    fn remember(&self, _source: &Path, passphrase: &SecretString) {
        if let Some(entry) = self.entry() {
            if let Err(err) = entry.set_password(passphrase.expose_secret()) {
                tracing::warn!(error = %err, "keychain write failed");
            }
        }
    }

    fn forget(&self, _source: &Path) {
        if let Some(entry) = self.entry() {
            match entry.delete_password() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(err) => tracing::warn!(error = %err, "keychain delete failed"),
            }
        }
    }
}

fn dir_hash(path: &Path) -> String {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let hash = blake3::hash(canonical.to_string_lossy().as_bytes());
    hash.to_hex()[..16].to_string()
}
