#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use restartwatch::config::ConfigFile;
use restartwatch::exec::{ProcessSupervisor, TerminationPolicy};
use restartwatch::fs::RealFileSystem;
use restartwatch::store::{InstallLayout, SignalStore};

use crate::fake_launcher::FakeLauncher;

/// Config tuned for tests: short settle, quick kill backoff, bounded waits.
pub fn fast_config() -> ConfigFile {
    let mut cfg = ConfigFile::default();
    cfg.signal.settle_ms = 20;
    cfg.bootstrap.delay_ms = 300;
    cfg.bootstrap.rendezvous_timeout_ms = 4_000;
    cfg.termination.max_kill_attempts = 5;
    cfg.termination.kill_backoff_ms = 5;
    cfg
}

/// Builder for a temporary installation root.
pub struct InstallBuilder {
    presets: Vec<String>,
    with_presets_dir: bool,
}

impl InstallBuilder {
    pub fn new() -> Self {
        Self {
            presets: Vec::new(),
            with_presets_dir: true,
        }
    }

    /// Add a preset folder `presets/<name>/` (without its restart dir).
    pub fn preset(mut self, name: &str) -> Self {
        self.presets.push(name.to_string());
        self
    }

    /// Leave `presets/` out entirely, so bootstrap has to create it.
    pub fn without_presets_dir(mut self) -> Self {
        self.with_presets_dir = false;
        self
    }

    pub fn build(self) -> TempInstall {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        if self.with_presets_dir {
            fs::create_dir_all(dir.path().join("presets")).expect("failed to create presets dir");
        }
        for name in &self.presets {
            fs::create_dir_all(dir.path().join("presets").join(name))
                .expect("failed to create preset dir");
        }
        TempInstall {
            dir,
            config: fast_config(),
        }
    }
}

impl Default for InstallBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A temporary installation root; removed on drop.
pub struct TempInstall {
    dir: TempDir,
    config: ConfigFile,
}

impl TempInstall {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn layout(&self) -> InstallLayout {
        InstallLayout::new(self.dir.path(), &self.config)
    }

    pub fn store(&self) -> SignalStore {
        SignalStore::new(Arc::new(RealFileSystem))
    }

    pub fn restart_dir(&self) -> PathBuf {
        self.layout().restart_dir().to_path_buf()
    }

    pub fn preset_restart_dir(&self, preset: &str) -> PathBuf {
        self.layout().preset_restart_dir(preset)
    }

    /// Supervisor over `launcher` using this install's termination policy.
    pub fn supervisor(&self, launcher: FakeLauncher) -> ProcessSupervisor<FakeLauncher> {
        ProcessSupervisor::new(launcher, TerminationPolicy::from(&self.config.termination))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.config.signal.settle_ms)
    }
}
