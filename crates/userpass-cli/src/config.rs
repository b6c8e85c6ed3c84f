use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use userpass_core::source::DEFAULT_EXTENSION;
use userpass_core::vault::DEFAULT_MAX_ATTEMPTS;

/// Contents of `config.toml`. Every section is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserpassConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub security: SecuritySection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub dir: Option<String>,
    pub host: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecuritySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_use_agent")]
    pub use_agent: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            dir: None,
            host: None,
            extension: default_extension(),
        }
    }
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            use_agent: default_use_agent(),
        }
    }
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_use_agent() -> bool {
    true
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

/// `$HOME/.userpass`
pub fn default_store_dir() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?.join(".userpass"))
}

/// Read the config file; a missing file yields the defaults.
pub fn read_config(path: &Path) -> anyhow::Result<UserpassConfig> {
    if !path.exists() {
        return Ok(UserpassConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: UserpassConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    if config.security.max_attempts == 0 {
        return Err(anyhow::anyhow!(
            "Invalid config {}: security.max_attempts must be at least 1",
            path.display()
        ));
    }
    Ok(config)
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("userpass"));
        }
    }
    Ok(home_dir()?.join(".config").join("userpass"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
