// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load the config at `path` if it exists, otherwise fall back to defaults.
///
/// Used for the implicit default location only; a path the user named
/// explicitly should go through [`load_and_validate`] so that a typo is an
/// error rather than a silent fallback.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if path.is_file() {
        load_and_validate(path)
    } else {
        debug!(?path, "no config file found; using built-in defaults");
        Ok(ConfigFile::default())
    }
}

/// Default config location for a given installation root.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join("restartwatch.toml")
}
