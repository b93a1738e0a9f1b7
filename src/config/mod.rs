// src/config/mod.rs

//! Configuration loading and validation for restartwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate paths, signal naming and termination bounds (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    BootstrapSection, ConfigFile, PathsSection, RawConfigFile, SignalSection,
    TerminationSection,
};
