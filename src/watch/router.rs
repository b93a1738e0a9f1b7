// src/watch/router.rs

use std::fmt;
use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RouterEvent;
use crate::errors::{Result, RestartError};
use crate::watch::events::{appeared_signals, SignalEvent};
use crate::watch::filter::SignalFilter;

/// Registers one filesystem watcher per signal directory and funnels every
/// matching creation into a single channel.
///
/// The channel has exactly one consumer (the dispatcher), which is what
/// serializes restart handling across all watched directories.
pub struct WatchRouter {
    tx: mpsc::UnboundedSender<RouterEvent>,
    watchers: Vec<(PathBuf, RecommendedWatcher)>,
}

impl fmt::Debug for WatchRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRouter")
            .field("dirs", &self.watched_dirs())
            .finish_non_exhaustive()
    }
}

impl WatchRouter {
    pub fn new(tx: mpsc::UnboundedSender<RouterEvent>) -> Self {
        Self {
            tx,
            watchers: Vec::new(),
        }
    }

    /// Start watching `directory` (non-recursively) for files matching
    /// `filter`.
    ///
    /// Fails with `WatchRegistration` if the directory cannot be watched,
    /// e.g. because it was removed after bootstrap.
    pub fn watch(&mut self, directory: &Path, filter: &SignalFilter) -> Result<()> {
        let registration_error = |source: notify::Error| RestartError::WatchRegistration {
            path: directory.to_path_buf(),
            source,
        };

        // Closure called synchronously by notify whenever an event arrives.
        let mut watcher = RecommendedWatcher::new(
            {
                let tx = self.tx.clone();
                let filter = filter.clone();
                let watched_dir = directory.to_path_buf();
                move |res: notify::Result<Event>| match res {
                    Ok(event) => {
                        for path in appeared_signals(&event, &filter) {
                            debug!(?path, kind = ?event.kind, "signal appeared");
                            let signal = SignalEvent {
                                path,
                                watched_dir: watched_dir.clone(),
                            };
                            if tx.send(RouterEvent::SignalCreated(signal)).is_err() {
                                warn!("dispatcher is gone; dropping restart signal");
                            }
                        }
                    }
                    Err(err) => {
                        warn!(dir = ?watched_dir, error = %err, "file watch error");
                    }
                }
            },
            Config::default(),
        )
        .map_err(registration_error)?;

        watcher
            .watch(directory, RecursiveMode::NonRecursive)
            .map_err(registration_error)?;

        info!(dir = ?directory, filter = %filter.pattern(), "watching for restart signals");
        self.watchers.push((directory.to_path_buf(), watcher));
        Ok(())
    }

    pub fn watched_dirs(&self) -> Vec<&Path> {
        self.watchers.iter().map(|(dir, _)| dir.as_path()).collect()
    }

    pub fn into_handle(self) -> WatcherHandle {
        WatcherHandle {
            dirs: self.watchers.iter().map(|(dir, _)| dir.clone()).collect(),
            _inner: self.watchers.into_iter().map(|(_, w)| w).collect(),
        }
    }
}

/// Keeps the registered watchers alive. Dropping it stops all watching.
pub struct WatcherHandle {
    dirs: Vec<PathBuf>,
    _inner: Vec<RecommendedWatcher>,
}

impl WatcherHandle {
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("dirs", &self.dirs)
            .finish()
    }
}
