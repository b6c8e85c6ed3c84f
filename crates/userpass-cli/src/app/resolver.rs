//! Resolution of config, store directory, host and source paths.

use std::path::PathBuf;

use userpass_core::source::{discover, local_host, source_path};

use crate::cli::Cli;
use crate::config::{default_config_path, default_store_dir, read_config};
use crate::constants::CONFIG_ENV;

/// Effective settings after merging flags, environment and config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub dir: PathBuf,
    pub host: String,
    pub extension: String,
    pub max_attempts: u32,
    pub use_agent: bool,
}

impl Settings {
    /// The source file this host writes to.
    pub fn local_source(&self) -> PathBuf {
        source_path(&self.dir, &self.host, &self.extension)
    }
}

/// Resolve the config file path, checking USERPASS_CONFIG first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Resolve settings; flags win over the config file, which wins over defaults.
pub fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let config_path = resolve_config_path()?;
    let config = read_config(&config_path)?;

    let dir = match cli.dir.as_ref().or(config.store.dir.as_ref()) {
        Some(dir) => PathBuf::from(dir),
        None => default_store_dir()?,
    };
    let host = match cli.host.as_ref().or(config.store.host.as_ref()) {
        Some(host) => host.clone(),
        None => local_host()?,
    };
    if host.contains(['/', '\\']) || host.trim().is_empty() {
        return Err(anyhow::anyhow!("Invalid host name '{}'", host));
    }

    Ok(Settings {
        config_path,
        dir,
        host,
        extension: config.store.extension,
        max_attempts: config.security.max_attempts,
        use_agent: config.security.use_agent && !cli.no_agent,
    })
}

/// Sources to read: explicit `--source` paths, else every file in the directory.
pub fn resolve_read_sources(cli: &Cli, settings: &Settings) -> anyhow::Result<Vec<PathBuf>> {
    if !cli.sources.is_empty() {
        return Ok(cli.sources.iter().map(PathBuf::from).collect());
    }
    Ok(discover(&settings.dir, &settings.extension)?)
}
