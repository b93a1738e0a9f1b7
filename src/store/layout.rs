// src/store/layout.rs

use std::path::{Path, PathBuf};

use crate::config::ConfigFile;

/// Resolved on-disk layout of a server installation.
///
/// ```text
/// <root>/
///   AssettoServer(.exe)
///   cfg/restart/                 base signal directory
///   presets/<name>/restart/      one signal directory per preset
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
    restart_dir: PathBuf,
    presets_dir: PathBuf,
    preset_restart_subdir: String,
    server_executable: PathBuf,
    init_signal_name: String,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>, cfg: &ConfigFile) -> Self {
        let root = root.into();
        Self {
            restart_dir: root.join(&cfg.paths.restart_dir),
            presets_dir: root.join(&cfg.paths.presets_dir),
            preset_restart_subdir: cfg.paths.preset_restart_subdir.clone(),
            server_executable: root.join(&cfg.paths.server_executable),
            init_signal_name: cfg.signal.init_file_name.clone(),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Base signal directory (`cfg/restart`).
    pub fn restart_dir(&self) -> &Path {
        &self.restart_dir
    }

    /// Presets root (`presets`).
    pub fn presets_dir(&self) -> &Path {
        &self.presets_dir
    }

    /// Signal directory of one preset (`presets/<name>/restart`).
    pub fn preset_restart_dir(&self, preset: &str) -> PathBuf {
        self.presets_dir.join(preset).join(&self.preset_restart_subdir)
    }

    pub fn server_executable(&self) -> &Path {
        &self.server_executable
    }

    pub fn init_signal_name(&self) -> &str {
        &self.init_signal_name
    }

    /// Full path of the synthetic bootstrap signal.
    pub fn init_signal_path(&self) -> PathBuf {
        self.restart_dir.join(&self.init_signal_name)
    }
}
