// src/config/validate.rs

use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, RestartError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::RestartError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_paths(cfg)?;
    validate_signal(cfg)?;
    validate_termination(cfg)?;
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let entries = [
        ("restart_dir", &cfg.paths.restart_dir),
        ("presets_dir", &cfg.paths.presets_dir),
        ("preset_restart_subdir", &cfg.paths.preset_restart_subdir),
        ("server_executable", &cfg.paths.server_executable),
    ];

    for (key, value) in entries {
        if value.trim().is_empty() {
            return Err(RestartError::ConfigError(format!(
                "[paths].{key} must not be empty"
            )));
        }
        if Path::new(value).is_absolute() {
            return Err(RestartError::ConfigError(format!(
                "[paths].{key} must be relative to the installation root (got {value:?})"
            )));
        }
    }

    Ok(())
}

fn validate_signal(cfg: &RawConfigFile) -> Result<()> {
    let suffix = &cfg.signal.suffix;

    if !suffix.starts_with('.') || suffix.len() < 2 {
        return Err(RestartError::ConfigError(format!(
            "[signal].suffix must look like \".ext\" (got {suffix:?})"
        )));
    }

    if suffix.contains(['*', '?', '[', ']', '{', '}', '/', '\\']) {
        return Err(RestartError::ConfigError(format!(
            "[signal].suffix must be a plain file extension (got {suffix:?})"
        )));
    }

    let init = &cfg.signal.init_file_name;
    if !init.ends_with(suffix.as_str()) || init.len() == suffix.len() {
        return Err(RestartError::ConfigError(format!(
            "[signal].init_file_name {init:?} must be a file name ending in {suffix:?}"
        )));
    }

    if init.contains(['/', '\\']) {
        return Err(RestartError::ConfigError(format!(
            "[signal].init_file_name must be a bare file name (got {init:?})"
        )));
    }

    Ok(())
}

fn validate_termination(cfg: &RawConfigFile) -> Result<()> {
    if cfg.termination.max_kill_attempts == 0 {
        return Err(RestartError::ConfigError(
            "[termination].max_kill_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}
