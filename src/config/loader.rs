// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable naming the route file when `--config` is absent.
pub const CONFIG_ENV: &str = "SYNCROUTE_CONFIG";

/// File name looked up in the current directory by default.
pub const DEFAULT_CONFIG_FILE: &str = "Syncroute.toml";

/// Read and deserialize a route file. No semantic validation; use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;
    debug!(path = %path.display(), routes = config.route.len(), "loaded route file");

    Ok(config)
}

/// Load a route file and validate it into domain routes.
///
/// Checks that there is at least one route, that every batch has sources
/// and destinations, that hooks have a line, and that `timeout` parses.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `$SYNCROUTE_CONFIG` if set and non-empty, else `Syncroute.toml`.
pub fn default_config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
