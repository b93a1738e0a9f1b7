// tests/dispatcher.rs
mod common;
use crate::common::builders::InstallBuilder;
use crate::common::fake_launcher::FakeLauncher;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;

use tokio::sync::mpsc;

use restartwatch::engine::{CycleOutcome, RestartDispatcher, RestartHandler, RouterEvent};
use restartwatch::watch::SignalEvent;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn burst_of_signals_is_handled_one_at_a_time() -> TestResult {
    init_tracing();
    let presets = ["A", "B", "C"];
    let install = InstallBuilder::new().preset("A").preset("B").preset("C").build();
    let launcher = FakeLauncher::new();
    let handler = RestartHandler::new(
        install.supervisor(launcher.clone()),
        install.store(),
        install.layout().server_executable(),
        install.settle(),
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(RestartDispatcher::new(handler, event_rx).with_reports(report_tx).run());

    // Queue everything before the dispatcher gets a chance to run.
    let mut expected = Vec::new();
    for i in 0..9 {
        let preset = presets[i % presets.len()];
        let dir = install.preset_restart_dir(preset);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{i}.asrestart"));
        fs::write(&path, preset)?;
        expected.push(format!("--preset=\"{preset}\""));
        event_tx.send(RouterEvent::SignalCreated(SignalEvent {
            path,
            watched_dir: dir,
        }))?;
    }

    for _ in 0..9 {
        let report = with_timeout(report_rx.recv()).await.expect("report channel closed");
        assert!(matches!(report.outcome, CycleOutcome::Restarted { .. }));
    }

    event_tx.send(RouterEvent::ShutdownRequested)?;
    let handler = with_timeout(task).await?;

    assert_eq!(launcher.arguments(), expected);
    assert_eq!(launcher.peak_alive(), 1, "two servers were alive at once");
    assert_eq!(launcher.kill_calls(), 8);
    let last = launcher.launches().last().map(|l| l.pid);
    assert_eq!(handler.supervisor().current_pid(), last);
    assert_eq!(launcher.alive().len(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_cycle_is_reported_and_dispatch_continues() -> TestResult {
    init_tracing();
    let install = InstallBuilder::new().preset("A").build();
    let launcher = FakeLauncher::new();
    let handler = RestartHandler::new(
        install.supervisor(launcher.clone()),
        install.store(),
        install.layout().server_executable(),
        install.settle(),
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(RestartDispatcher::new(handler, event_rx).with_reports(report_tx).run());

    let dir = install.restart_dir();
    fs::create_dir_all(&dir)?;

    launcher.set_fail_launches(true);
    let bad = dir.join("bad.asrestart");
    fs::write(&bad, "A")?;
    event_tx.send(RouterEvent::SignalCreated(SignalEvent {
        path: bad.clone(),
        watched_dir: dir.clone(),
    }))?;

    let report = with_timeout(report_rx.recv()).await.expect("report channel closed");
    assert_eq!(report.signal, bad);
    assert!(matches!(report.outcome, CycleOutcome::Failed(ref msg) if msg.contains("launch")));

    launcher.set_fail_launches(false);
    let good = dir.join("good.asrestart");
    fs::write(&good, "A")?;
    event_tx.send(RouterEvent::SignalCreated(SignalEvent {
        path: good.clone(),
        watched_dir: dir,
    }))?;

    let report = with_timeout(report_rx.recv()).await.expect("report channel closed");
    assert_eq!(report.signal, good);
    assert!(matches!(report.outcome, CycleOutcome::Restarted { .. }));

    drop(event_tx);
    let handler = with_timeout(task).await?;
    assert!(handler.supervisor().has_current());
    Ok(())
}
