// src/engine/handler.rs

//! The restart cycle itself.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::engine::CycleOutcome;
use crate::errors::Result;
use crate::exec::{ProcessLauncher, ProcessSupervisor};
use crate::store::SignalStore;
use crate::watch::SignalEvent;

/// Build the server's launch argument for `preset`.
///
/// The preset is embedded verbatim. Embedded `"` characters are not escaped.
pub fn preset_argument(preset: &str) -> String {
    format!("--preset=\"{preset}\"")
}

/// Runs one restart cycle per signal.
///
/// Not reentrant: `handle` takes `&mut self`, and the dispatcher owns the
/// only instance, so cycles never overlap.
pub struct RestartHandler<L: ProcessLauncher> {
    supervisor: ProcessSupervisor<L>,
    store: SignalStore,
    executable: PathBuf,
    settle: Duration,
    /// Signals already handled whose delete failed. They stay on disk, so
    /// further events for them are duplicates until the file goes away.
    undeleted: HashSet<PathBuf>,
}

impl<L: ProcessLauncher> fmt::Debug for RestartHandler<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestartHandler")
            .field("supervisor", &self.supervisor)
            .field("executable", &self.executable)
            .field("settle", &self.settle)
            .field("undeleted", &self.undeleted)
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher> RestartHandler<L> {
    pub fn new(
        supervisor: ProcessSupervisor<L>,
        store: SignalStore,
        executable: impl Into<PathBuf>,
        settle: Duration,
    ) -> Self {
        Self {
            supervisor,
            store,
            executable: executable.into(),
            settle,
            undeleted: HashSet::new(),
        }
    }

    pub fn supervisor(&self) -> &ProcessSupervisor<L> {
        &self.supervisor
    }

    /// Handle one signal:
    /// 1. stop the current server, if any
    /// 2. read + delete the signal, trimming the preset name
    /// 3. start the server with `--preset="<name>"`
    ///
    /// Errors abort the cycle where they happen. A failed delete does not:
    /// the server is still started with the preset that was read.
    pub async fn handle(&mut self, signal: &SignalEvent) -> Result<CycleOutcome> {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        // Duplicate notifications for an already-consumed file must not take
        // the server down without a replacement.
        if !self.store.is_pending(&signal.path) {
            self.undeleted.remove(&signal.path);
            debug!(signal = ?signal.path, "signal already consumed; skipping");
            return Ok(CycleOutcome::Skipped);
        }
        if self.undeleted.contains(&signal.path) {
            debug!(signal = ?signal.path, "signal already handled but not deleted; skipping");
            return Ok(CycleOutcome::Skipped);
        }

        if self.supervisor.has_current() {
            self.supervisor.stop().await?;
        }

        info!("Restart file found: {}", signal.file_name());

        let consumed = self.store.read_and_consume(&signal.path)?;
        let preset = consumed.preset;
        if consumed.removal.is_err() {
            self.undeleted.insert(signal.path.clone());
        }

        info!("-----");

        if preset.contains('"') {
            warn!(%preset, "preset name contains '\"'; passing it through unescaped");
        }

        let argument = preset_argument(&preset);
        let pid = self.supervisor.start(&self.executable, &argument)?;

        info!(
            "Server restarted with Process-ID: {}",
            pid.map(|p| p.to_string()).unwrap_or_default()
        );
        info!("Using config preset: {}", preset);

        if let Err(err) = consumed.removal {
            error!(signal = ?signal.path, error = %err, "failed to delete restart file");
        }

        Ok(CycleOutcome::Restarted { preset, pid })
    }
}
