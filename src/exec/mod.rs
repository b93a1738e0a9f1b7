// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ProcessLauncher` / `ManagedChild` traits and
//!   the production `RealProcessLauncher` (detached `tokio::process` child).
//! - [`supervisor`] owns the single current server process and implements
//!   the bounded hard-kill loop.

pub mod backend;
pub mod supervisor;

pub use backend::{ManagedChild, ProcessLauncher, RealProcessLauncher};
pub use supervisor::{ProcessSupervisor, TerminationPolicy};
