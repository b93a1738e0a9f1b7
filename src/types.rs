// src/types.rs

use serde::Deserialize;

/// Logical preset identifier: a directory name under the presets root.
///
/// Signal files may carry any string; it is never checked against the
/// discovered set.
pub type PresetName = String;

/// How `init()` waits for the synthetic bootstrap signal to be handled.
///
/// - `Rendezvous`: wait until the dispatcher reports the init cycle finished
///   (bounded by a timeout). Default.
/// - `FixedDelay`: sleep a fixed interval and carry on, whatever happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapMode {
    #[default]
    Rendezvous,
    FixedDelay,
}
