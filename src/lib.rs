// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod orchestrator;
pub mod store;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, load_or_default, ConfigFile};
use crate::engine::{CycleReport, RestartDispatcher, RestartHandler, RouterEvent};
use crate::exec::{ProcessSupervisor, RealProcessLauncher, TerminationPolicy};
use crate::fs::{FileSystem, RealFileSystem};
use crate::orchestrator::Orchestrator;
use crate::store::{InstallLayout, SignalStore};
use crate::watch::{SignalFilter, WatchRouter};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and layout resolution
/// - directory bootstrap + one watcher per signal directory
/// - the dispatcher owning the process supervisor
/// - the synthetic init signal
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let root = resolve_root(args.root.as_ref())?;
    let cfg = match &args.config {
        Some(path) => load_and_validate(root.join(path))?,
        None => load_or_default(default_config_path(&root))?,
    };

    let layout = InstallLayout::new(&root, &cfg);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let store = SignalStore::new(fs);

    if args.dry_run {
        print_dry_run(&layout, &store, &cfg);
        return Ok(());
    }

    let filter = SignalFilter::from_suffix(&cfg.signal.suffix)?;
    let orchestrator = Orchestrator::new(
        layout.clone(),
        store.clone(),
        filter,
        cfg.bootstrap.clone(),
    );

    // Every watcher sends into this one channel; the dispatcher is its only
    // consumer.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<RouterEvent>();
    let boot = orchestrator.bootstrap(WatchRouter::new(event_tx.clone()))?;

    let supervisor = ProcessSupervisor::new(
        RealProcessLauncher::new(layout.root()),
        TerminationPolicy::from(&cfg.termination),
    );
    let handler = RestartHandler::new(
        supervisor,
        store,
        layout.server_executable(),
        Duration::from_millis(cfg.signal.settle_ms),
    );

    let (report_tx, mut report_rx) = mpsc::unbounded_channel::<CycleReport>();
    let dispatcher = RestartDispatcher::new(handler, event_rx).with_reports(report_tx);
    let dispatcher_task = tokio::spawn(dispatcher.run());

    // Ctrl-C → stop dispatching. The server process is left running.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RouterEvent::ShutdownRequested);
        });
    }
    drop(event_tx);

    orchestrator.init(&boot.presets, Some(&mut report_rx)).await?;
    drop(report_rx);

    let handler = dispatcher_task.await.context("restart dispatcher panicked")?;
    info!(
        pid = ?handler.supervisor().current_pid(),
        "restart service stopped"
    );

    drop(boot.watcher);
    Ok(())
}

fn resolve_root(root: Option<&PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root.clone()),
        None => std::env::current_dir().context("resolving current working directory"),
    }
}

/// Print the resolved layout and the presets that would be watched.
fn print_dry_run(layout: &InstallLayout, store: &SignalStore, cfg: &ConfigFile) {
    println!("restartwatch dry-run");
    println!("  root              = {}", layout.root().display());
    println!("  server executable = {}", layout.server_executable().display());
    println!("  restart dir       = {}", layout.restart_dir().display());
    println!("  presets dir       = {}", layout.presets_dir().display());
    println!("  signal filter     = *{}", cfg.signal.suffix);
    println!("  init signal       = {}", layout.init_signal_path().display());
    println!("  bootstrap mode    = {:?}", cfg.bootstrap.mode);
    println!();

    match store.list_preset_directories(layout.presets_dir()) {
        Ok(presets) => {
            println!("presets ({}):", presets.len());
            for preset in presets {
                println!("  - {preset}");
                println!("      watch: {}", layout.preset_restart_dir(&preset).display());
            }
        }
        Err(err) => println!("presets: unavailable ({err})"),
    }
}
