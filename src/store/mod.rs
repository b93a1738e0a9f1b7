// src/store/mod.rs

//! Signal storage.
//!
//! - [`layout`] resolves the installation's directory layout.
//! - [`signal_store`] creates the watched directories and writes / consumes
//!   restart-signal files through the [`crate::fs::FileSystem`] seam.

pub mod layout;
pub mod signal_store;

pub use layout::InstallLayout;
pub use signal_store::{ConsumedSignal, SignalStore};
