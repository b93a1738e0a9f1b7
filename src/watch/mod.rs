// src/watch/mod.rs

//! Restart-signal watching.
//!
//! This module is responsible for:
//! - Compiling the signal file-name filter (`*.asrestart`).
//! - Wiring up one cross-platform filesystem watcher (`notify`) per signal
//!   directory.
//! - Classifying raw events into "a signal file appeared".
//!
//! It does **not** restart anything; it only forwards [`SignalEvent`]s to
//! the dispatcher channel.

pub mod events;
pub mod filter;
pub mod router;

pub use events::{appeared_signals, SignalEvent};
pub use filter::SignalFilter;
pub use router::{WatchRouter, WatcherHandle};
