// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestartError {
    /// Directory creation, signal read/write or signal deletion failed.
    #[error("IO error: {0:#}")]
    Io(anyhow::Error),

    #[error("failed to launch {executable:?}: {source}")]
    Launch {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no presets found under {0:?}")]
    NoPresets(PathBuf),

    #[error("no active server process to stop")]
    NoActiveProcess,

    #[error("process {pid:?} did not exit after {attempts} kill attempts")]
    TerminationTimeout { pid: Option<u32>, attempts: u32 },

    #[error("a server process is still current (pid {0:?}); stop it first")]
    AlreadyRunning(Option<u32>),

    #[error("failed to watch {path:?}: {source}")]
    WatchRegistration {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for RestartError {
    fn from(err: std::io::Error) -> Self {
        RestartError::Io(anyhow::Error::from(err))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RestartError>;
