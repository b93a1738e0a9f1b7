// src/engine/mod.rs

//! Restart engine.
//!
//! This module ties together:
//! - the restart handler (stop old server, consume signal, start new server)
//! - the dispatcher loop that feeds it one event at a time, whichever
//!   directory the event came from
//!
//! The handler lives in [`handler`]; the single-consumer loop in
//! [`dispatcher`].

use std::path::PathBuf;

use crate::types::PresetName;
use crate::watch::SignalEvent;

/// Events flowing into the dispatcher from watchers and signal handlers.
#[derive(Debug, Clone)]
pub enum RouterEvent {
    /// A restart-signal file appeared in a watched directory.
    SignalCreated(SignalEvent),
    /// Stop dispatching (e.g. Ctrl-C). The managed server keeps running.
    ShutdownRequested,
}

/// How a single restart cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Old server stopped (if any), new one launched.
    Restarted {
        preset: PresetName,
        pid: Option<u32>,
    },
    /// The signal was already consumed; nothing was touched.
    Skipped,
    /// The cycle aborted; the message is the error that ended it.
    Failed(String),
}

/// Emitted by the dispatcher after every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub signal: PathBuf,
    pub outcome: CycleOutcome,
}

pub mod dispatcher;
pub mod handler;

pub use dispatcher::RestartDispatcher;
pub use handler::{preset_argument, RestartHandler};
