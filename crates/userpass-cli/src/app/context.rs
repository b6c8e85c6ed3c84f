//! Application context for the Userpass CLI.
//!
//! Provides a unified context that combines CLI arguments with
//! lazily-resolved settings, and opens stores through a session vault.

use std::io::IsTerminal;
use std::path::PathBuf;

use once_cell::unsync::OnceCell;
use userpass_core::{AgeVault, DecryptOptions, Store};

use crate::cli::Cli;
use crate::errors::CliError;

use super::passphrase::{KeychainAgent, TerminalPrompt};
use super::resolver::{resolve_read_sources, resolve_settings, Settings};

/// The vault used for one run of the program.
pub type SessionVault = AgeVault<TerminalPrompt, KeychainAgent>;

/// Application context that bundles CLI args with resolved settings.
pub struct AppContext<'a> {
    cli: &'a Cli,
    settings: OnceCell<Settings>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            settings: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Prompts are allowed: stdin is a terminal and --no-input is off.
    pub fn interactive(&self) -> bool {
        std::io::stdin().is_terminal() && !self.cli.no_input
    }

    /// Get the settings, resolving them lazily if needed.
    pub fn settings(&self) -> anyhow::Result<&Settings> {
        self.settings.get_or_try_init(|| resolve_settings(self.cli))
    }

    /// Build the vault for this session. Its credential cache lives as long
    /// as the returned value.
    pub fn vault(&self) -> anyhow::Result<SessionVault> {
        let settings = self.settings()?;
        let options = DecryptOptions {
            max_attempts: settings.max_attempts,
            use_agent: settings.use_agent,
        };
        Ok(AgeVault::with_agent(
            TerminalPrompt::new(self.interactive()),
            KeychainAgent::for_dir(&settings.dir),
            options,
        ))
    }

    /// Sources a read merges.
    pub fn read_sources(&self) -> anyhow::Result<Vec<PathBuf>> {
        resolve_read_sources(self.cli, self.settings()?)
    }

    /// Load every readable source into one read-only store.
    pub fn load_merged(&self, vault: &mut SessionVault) -> anyhow::Result<Store> {
        let sources = self.read_sources()?;
        if sources.is_empty() {
            let dir = &self.settings()?.dir;
            return Err(CliError::not_found(
                format!("No source files in {}", dir.display()),
                "Hint: Create one with `userpass add KEY`.",
            )
            .into());
        }
        let mut store = Store::new();
        store.load(&sources, vault)?;
        Ok(store)
    }

    /// Load only this host's source, if it exists yet.
    ///
    /// Returns the store and the path a save must target.
    pub fn load_local(&self, vault: &mut SessionVault) -> anyhow::Result<(Store, PathBuf)> {
        let target = self.settings()?.local_source();
        let mut store = Store::new();
        if target.exists() {
            store.load(&[&target], vault)?;
        }
        Ok((store, target))
    }
}
