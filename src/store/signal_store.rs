// src/store/signal_store.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, RestartError};
use crate::fs::FileSystem;
use crate::types::PresetName;

/// Suffix appended to a signal while it is being written, so the watcher
/// never sees a half-written file under its final name.
const PARTIAL_SUFFIX: &str = ".tmp";

/// Editors on Windows commonly prefix UTF-8 text files with this.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Content of a consumed signal file.
///
/// Reading and deleting are not transactional: `removal` carries the outcome
/// of the delete, while `preset` is usable either way.
#[derive(Debug)]
pub struct ConsumedSignal {
    pub preset: PresetName,
    pub removal: Result<()>,
}

/// Directory bootstrapping and signal-file IO on top of a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct SignalStore {
    fs: Arc<dyn FileSystem>,
}

impl SignalStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Create `path` and any missing parents. Idempotent.
    ///
    /// Fails when a non-directory already occupies the path (or one of its
    /// parents), or when creation is not permitted.
    pub fn ensure_directory(&self, path: &Path) -> Result<()> {
        if self.fs.is_dir(path) {
            return Ok(());
        }
        if self.fs.exists(path) {
            return Err(RestartError::Io(anyhow::anyhow!(
                "{:?} exists but is not a directory",
                path
            )));
        }
        debug!(?path, "creating directory");
        self.fs.create_dir_all(path).map_err(RestartError::Io)
    }

    /// Names of the subdirectories directly under `presets_root`, sorted.
    ///
    /// Plain files and names that are not valid UTF-8 are skipped. An empty
    /// list is a valid result.
    pub fn list_preset_directories(&self, presets_root: &Path) -> Result<Vec<PresetName>> {
        let entries = self.fs.read_dir(presets_root).map_err(RestartError::Io)?;

        let mut names: Vec<PresetName> = entries
            .iter()
            .filter(|p| self.fs.is_dir(p))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        names.sort();

        Ok(names)
    }

    /// Write a new signal file named `file_name` inside `directory`.
    ///
    /// The content goes to `<file_name>.tmp` first and is then renamed onto
    /// the final name, so the appearance of the signal is a single event.
    pub fn write_signal(&self, directory: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
        let final_path = directory.join(file_name);
        let partial_path = directory.join(format!("{file_name}{PARTIAL_SUFFIX}"));

        self.fs
            .write(&partial_path, content.as_bytes())
            .map_err(RestartError::Io)?;
        self.fs
            .rename(&partial_path, &final_path)
            .map_err(RestartError::Io)?;

        debug!(path = ?final_path, "signal written");
        Ok(final_path)
    }

    /// Read a signal, drop a leading UTF-8 byte-order mark, trim surrounding
    /// whitespace, then delete the file.
    ///
    /// A failed read leaves the file in place and is returned as an error.
    /// A failed delete is reported in [`ConsumedSignal::removal`].
    pub fn read_and_consume(&self, signal_path: &Path) -> Result<ConsumedSignal> {
        let raw = self
            .fs
            .read_to_string(signal_path)
            .map_err(RestartError::Io)?;
        let preset = raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&raw).trim().to_string();

        let removal = self
            .fs
            .remove_file(signal_path)
            .map_err(RestartError::Io);

        Ok(ConsumedSignal { preset, removal })
    }

    /// Whether a signal is still on disk (i.e. not yet consumed).
    pub fn is_pending(&self, signal_path: &Path) -> bool {
        self.fs.is_file(signal_path)
    }
}
