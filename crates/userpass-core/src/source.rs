//! Per-host source naming and discovery.
//!
//! Each host writes only its own file, `userpass.<host>.<ext>`, inside a
//! shared directory; readers merge every file they find there.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, UserpassError};

/// File name prefix shared by all sources.
pub const SOURCE_PREFIX: &str = "userpass.";

/// Default source extension (age-encrypted).
pub const DEFAULT_EXTENSION: &str = "age";

/// Path of the source owned by `host` in `dir`.
pub fn source_path(dir: &Path, host: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}{}.{}", SOURCE_PREFIX, host, extension))
}

/// Host name a source file belongs to, if it follows the naming convention.
pub fn source_host(path: &Path, extension: &str) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let host = name
        .strip_prefix(SOURCE_PREFIX)?
        .strip_suffix(extension)?
        .strip_suffix('.')?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Every source file in `dir`, sorted by path.
///
/// A missing directory yields no sources.
pub fn discover(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(UserpassError::Storage(format!(
                "Failed to read source directory {}: {}",
                dir.display(),
                err
            )))
        }
    };

    let mut sources = Vec::new();
    for entry in read_dir {
        let path = entry?.path();
        if path.is_file() && source_host(&path, extension).is_some() {
            sources.push(path);
        }
    }
    sources.sort();
    tracing::debug!(dir = %dir.display(), count = sources.len(), "discovered sources");
    Ok(sources)
}

/// Host name of this machine, used to pick the writable source.
pub fn local_host() -> Result<String> {
    let name = hostname::get()
        .map_err(|e| UserpassError::Storage(format!("Failed to read hostname: {}", e)))?;
    let name = name.to_string_lossy();
    // Only the short name; domains differ between networks.
    let short = name.split('.').next().unwrap_or_default().trim();
    if short.is_empty() {
        return Err(UserpassError::Storage("Hostname is empty".to_string()));
    }
    Ok(short.to_string())
}
