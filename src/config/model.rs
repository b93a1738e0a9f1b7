// src/config/model.rs

use serde::Deserialize;

use crate::types::BootstrapMode;

/// Configuration as read from `restartwatch.toml`.
///
/// Every section is optional; an empty file (or no file at all) yields the
/// stock installation layout:
///
/// ```toml
/// [paths]
/// restart_dir = "cfg/restart"
/// presets_dir = "presets"
/// preset_restart_subdir = "restart"
/// server_executable = "AssettoServer.exe"
///
/// [signal]
/// suffix = ".asrestart"
/// init_file_name = "init.asrestart"
///
/// [bootstrap]
/// mode = "rendezvous"
///
/// [termination]
/// max_kill_attempts = 50
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub signal: SignalSection,

    #[serde(default)]
    pub bootstrap: BootstrapSection,

    #[serde(default)]
    pub termination: TerminationSection,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathsSection,
    pub signal: SignalSection,
    pub bootstrap: BootstrapSection,
    pub termination: TerminationSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            signal: raw.signal,
            bootstrap: raw.bootstrap,
            termination: raw.termination,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[paths]` section. All entries are relative to the installation root.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_restart_dir")]
    pub restart_dir: String,

    #[serde(default = "default_presets_dir")]
    pub presets_dir: String,

    /// Name of the signal directory inside every preset folder.
    #[serde(default = "default_preset_restart_subdir")]
    pub preset_restart_subdir: String,

    #[serde(default = "default_server_executable")]
    pub server_executable: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            restart_dir: default_restart_dir(),
            presets_dir: default_presets_dir(),
            preset_restart_subdir: default_preset_restart_subdir(),
            server_executable: default_server_executable(),
        }
    }
}

/// `[signal]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalSection {
    /// File-name suffix that marks a restart signal.
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Name of the synthetic signal written at startup.
    #[serde(default = "default_init_file_name")]
    pub init_file_name: String,

    /// Pause between noticing a signal and reading it, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for SignalSection {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            init_file_name: default_init_file_name(),
            settle_ms: default_settle_ms(),
        }
    }
}

/// `[bootstrap]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapSection {
    #[serde(default)]
    pub mode: BootstrapMode,

    /// Sleep used by `fixed_delay` mode.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Upper bound on the wait in `rendezvous` mode.
    #[serde(default = "default_rendezvous_timeout_ms")]
    pub rendezvous_timeout_ms: u64,
}

impl Default for BootstrapSection {
    fn default() -> Self {
        Self {
            mode: BootstrapMode::default(),
            delay_ms: default_delay_ms(),
            rendezvous_timeout_ms: default_rendezvous_timeout_ms(),
        }
    }
}

/// `[termination]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TerminationSection {
    #[serde(default = "default_max_kill_attempts")]
    pub max_kill_attempts: u32,

    #[serde(default = "default_kill_backoff_ms")]
    pub kill_backoff_ms: u64,
}

impl Default for TerminationSection {
    fn default() -> Self {
        Self {
            max_kill_attempts: default_max_kill_attempts(),
            kill_backoff_ms: default_kill_backoff_ms(),
        }
    }
}

fn default_restart_dir() -> String {
    "cfg/restart".to_string()
}

fn default_presets_dir() -> String {
    "presets".to_string()
}

fn default_preset_restart_subdir() -> String {
    "restart".to_string()
}

fn default_server_executable() -> String {
    if cfg!(windows) {
        "AssettoServer.exe".to_string()
    } else {
        "AssettoServer".to_string()
    }
}

fn default_suffix() -> String {
    ".asrestart".to_string()
}

fn default_init_file_name() -> String {
    "init.asrestart".to_string()
}

fn default_settle_ms() -> u64 {
    100
}

fn default_delay_ms() -> u64 {
    2_000
}

fn default_rendezvous_timeout_ms() -> u64 {
    10_000
}

fn default_max_kill_attempts() -> u32 {
    50
}

fn default_kill_backoff_ms() -> u64 {
    100
}
