// src/orchestrator.rs

//! Startup: directory bootstrapping, watch registration and the synthetic
//! first restart signal.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::config::BootstrapSection;
use crate::engine::{CycleOutcome, CycleReport};
use crate::errors::{Result, RestartError};
use crate::store::{InstallLayout, SignalStore};
use crate::types::{BootstrapMode, PresetName};
use crate::watch::{SignalFilter, WatchRouter, WatcherHandle};

/// Result of [`Orchestrator::bootstrap`].
#[derive(Debug)]
pub struct Bootstrap {
    /// Presets discovered by the one and only listing of the presets root.
    pub presets: Vec<PresetName>,
    /// Every directory now being watched (base first, then per preset).
    pub watch_dirs: Vec<PathBuf>,
    /// Keeps the watchers alive.
    pub watcher: WatcherHandle,
}

#[derive(Debug)]
pub struct Orchestrator {
    layout: InstallLayout,
    store: SignalStore,
    filter: SignalFilter,
    settings: BootstrapSection,
}

impl Orchestrator {
    pub fn new(
        layout: InstallLayout,
        store: SignalStore,
        filter: SignalFilter,
        settings: BootstrapSection,
    ) -> Self {
        Self {
            layout,
            store,
            filter,
            settings,
        }
    }

    /// Create the signal directories and register a watch on each of them.
    ///
    /// All watches are in place before this returns, so no signal written
    /// afterwards can be missed.
    pub fn bootstrap(&self, mut router: WatchRouter) -> Result<Bootstrap> {
        self.store.ensure_directory(self.layout.restart_dir())?;
        self.store.ensure_directory(self.layout.presets_dir())?;

        let presets = self
            .store
            .list_preset_directories(self.layout.presets_dir())?;

        let mut watch_dirs = vec![self.layout.restart_dir().to_path_buf()];
        for preset in &presets {
            let dir = self.layout.preset_restart_dir(preset);
            self.store.ensure_directory(&dir)?;
            watch_dirs.push(dir);
        }

        for dir in &watch_dirs {
            router.watch(dir, &self.filter)?;
        }

        debug!(?presets, dirs = watch_dirs.len(), "bootstrap complete");

        Ok(Bootstrap {
            presets,
            watch_dirs,
            watcher: router.into_handle(),
        })
    }

    /// Announce startup, pick a random preset and drop the init signal into
    /// the base restart directory, then wait for it to be handled.
    ///
    /// `reports` is required for rendezvous mode; without it the fixed delay
    /// is used instead. Returns the chosen preset.
    pub async fn init(
        &self,
        presets: &[PresetName],
        reports: Option<&mut mpsc::UnboundedReceiver<CycleReport>>,
    ) -> Result<PresetName> {
        info!("Starting restart service.");
        info!("Base directory: {}", self.layout.root().display());
        info!("Preset directory: {}", self.layout.presets_dir().display());

        let preset = pick_preset(presets, self.layout.presets_dir())?;
        debug!(%preset, "picked initial preset");

        self.store.write_signal(
            self.layout.restart_dir(),
            self.layout.init_signal_name(),
            &preset,
        )?;

        match (self.settings.mode, reports) {
            (BootstrapMode::Rendezvous, Some(reports)) => {
                self.await_init_cycle(reports).await?;
            }
            (BootstrapMode::Rendezvous, None) => {
                debug!("no report channel; falling back to fixed delay");
                tokio::time::sleep(Duration::from_millis(self.settings.delay_ms)).await;
            }
            (BootstrapMode::FixedDelay, _) => {
                tokio::time::sleep(Duration::from_millis(self.settings.delay_ms)).await;
            }
        }

        Ok(preset)
    }

    async fn await_init_cycle(
        &self,
        reports: &mut mpsc::UnboundedReceiver<CycleReport>,
    ) -> Result<()> {
        let deadline =
            Instant::now() + Duration::from_millis(self.settings.rendezvous_timeout_ms);
        let init_name = self.layout.init_signal_name();

        loop {
            let report = match timeout_at(deadline, reports.recv()).await {
                Ok(Some(report)) => report,
                Ok(None) => {
                    warn!("dispatcher stopped before the initial restart completed");
                    return Ok(());
                }
                Err(_) => {
                    warn!(
                        timeout_ms = self.settings.rendezvous_timeout_ms,
                        "initial restart not confirmed in time; continuing"
                    );
                    return Ok(());
                }
            };

            if !is_signal_named(&report.signal, init_name) {
                continue;
            }

            return match report.outcome {
                CycleOutcome::Restarted { .. } => Ok(()),
                // Consumed by an earlier duplicate event; keep waiting for
                // the cycle that actually handled it.
                CycleOutcome::Skipped => continue,
                CycleOutcome::Failed(msg) => Err(RestartError::Other(anyhow::anyhow!(
                    "initial restart failed: {msg}"
                ))),
            };
        }
    }
}

/// Choose one preset uniformly at random.
///
/// An empty list is `NoPresets`: there is nothing to start the server with.
pub fn pick_preset(presets: &[PresetName], presets_dir: &Path) -> Result<PresetName> {
    presets
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| RestartError::NoPresets(presets_dir.to_path_buf()))
}

fn is_signal_named(path: &Path, name: &str) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some(name)
}
