// tests/config_loading.rs
mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;

use tempfile::NamedTempFile;

use restartwatch::config::{load_and_validate, load_or_default, ConfigFile};
use restartwatch::errors::RestartError;
use restartwatch::types::BootstrapMode;

type TestResult = Result<(), Box<dyn Error>>;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn empty_file_yields_stock_layout() -> TestResult {
    init_tracing();
    let file = config_file("");
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.paths.restart_dir, "cfg/restart");
    assert_eq!(cfg.paths.presets_dir, "presets");
    assert_eq!(cfg.paths.preset_restart_subdir, "restart");
    assert_eq!(cfg.signal.suffix, ".asrestart");
    assert_eq!(cfg.signal.init_file_name, "init.asrestart");
    assert_eq!(cfg.bootstrap.mode, BootstrapMode::Rendezvous);
    assert_eq!(cfg.bootstrap.delay_ms, 2_000);
    assert!(cfg.termination.max_kill_attempts >= 1);
    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    init_tracing();
    let file = config_file(
        r#"
[paths]
server_executable = "bin/server"

[signal]
suffix = ".restart"
init_file_name = "boot.restart"
settle_ms = 0

[bootstrap]
mode = "fixed_delay"
delay_ms = 500

[termination]
max_kill_attempts = 3
kill_backoff_ms = 10
"#,
    );
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.paths.server_executable, "bin/server");
    assert_eq!(cfg.paths.restart_dir, "cfg/restart");
    assert_eq!(cfg.signal.suffix, ".restart");
    assert_eq!(cfg.signal.init_file_name, "boot.restart");
    assert_eq!(cfg.signal.settle_ms, 0);
    assert_eq!(cfg.bootstrap.mode, BootstrapMode::FixedDelay);
    assert_eq!(cfg.bootstrap.delay_ms, 500);
    assert_eq!(cfg.termination.max_kill_attempts, 3);
    assert_eq!(cfg.termination.kill_backoff_ms, 10);
    Ok(())
}

#[test]
fn zero_kill_attempts_is_rejected() {
    init_tracing();
    let file = config_file("[termination]\nmax_kill_attempts = 0\n");

    match load_and_validate(file.path()) {
        Err(RestartError::ConfigError(msg)) => assert!(msg.contains("max_kill_attempts")),
        other => panic!("expected ConfigError, got {:?}", other),
    }
}

#[test]
fn init_file_must_carry_the_signal_suffix() {
    init_tracing();
    let file = config_file("[signal]\ninit_file_name = \"init.txt\"\n");

    match load_and_validate(file.path()) {
        Err(RestartError::ConfigError(msg)) => assert!(msg.contains("init_file_name")),
        other => panic!("expected ConfigError, got {:?}", other),
    }
}

#[test]
fn suffix_must_be_a_plain_extension() {
    init_tracing();
    for bad in ["asrestart", ".", ".as*restart"] {
        let file = config_file(&format!(
            "[signal]\nsuffix = \"{bad}\"\ninit_file_name = \"init{bad}\"\n"
        ));
        match load_and_validate(file.path()) {
            Err(RestartError::ConfigError(msg)) => assert!(msg.contains("suffix"), "{msg}"),
            other => panic!("expected ConfigError for {bad:?}, got {:?}", other),
        }
    }
}

#[test]
fn absolute_paths_are_rejected() {
    init_tracing();
    let abs = if cfg!(windows) { "C:\\\\presets" } else { "/srv/presets" };
    let file = config_file(&format!("[paths]\npresets_dir = \"{abs}\"\n"));

    match load_and_validate(file.path()) {
        Err(RestartError::ConfigError(msg)) => assert!(msg.contains("presets_dir")),
        other => panic!("expected ConfigError, got {:?}", other),
    }
}

#[test]
fn unknown_bootstrap_mode_is_a_toml_error() {
    init_tracing();
    let file = config_file("[bootstrap]\nmode = \"eventually\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(RestartError::TomlError(_))
    ));
}

#[test]
fn missing_default_config_falls_back_to_defaults() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let cfg = load_or_default(dir.path().join("restartwatch.toml"))?;
    let stock = ConfigFile::default();

    assert_eq!(cfg.paths.restart_dir, stock.paths.restart_dir);
    assert_eq!(cfg.signal.suffix, stock.signal.suffix);
    Ok(())
}

#[test]
fn missing_explicit_config_is_an_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        load_and_validate(dir.path().join("nope.toml")),
        Err(RestartError::Io(_))
    ));
}
