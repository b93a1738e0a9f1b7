// src/watch/events.rs

//! Turning raw `notify` events into "a signal file appeared" notices.

use std::path::PathBuf;

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind};

use crate::watch::filter::SignalFilter;

/// A restart-signal file showed up in a watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalEvent {
    /// Full path of the signal file.
    pub path: PathBuf,
    /// The watched directory the event was registered on.
    pub watched_dir: PathBuf,
}

impl SignalEvent {
    /// File name for log output.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Paths in `event` that count as a newly appeared signal.
///
/// Creations count, and so do renames onto a matching name (atomic writers
/// and `mv` produce those instead of a create). Platforms that cannot tell
/// the two ends of a rename apart report `RenameMode::Any`; there the path
/// must still exist to count.
pub fn appeared_signals(event: &Event, filter: &SignalFilter) -> Vec<PathBuf> {
    let candidates: Vec<&PathBuf> = match event.kind {
        EventKind::Create(CreateKind::Folder) => return Vec::new(),
        EventKind::Create(_) => event.paths.iter().collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths.iter().collect(),
        // `[from, to]`: only the destination is new.
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.last().into_iter().collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => {
            event.paths.iter().filter(|p| p.exists()).collect()
        }
        _ => return Vec::new(),
    };

    candidates
        .into_iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}
