// tests/restart_handler.rs
mod common;
use crate::common::builders::InstallBuilder;
use crate::common::fake_launcher::FakeLauncher;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use restartwatch::engine::{preset_argument, CycleOutcome, RestartHandler};
use restartwatch::errors::RestartError;
use restartwatch::exec::{ProcessSupervisor, TerminationPolicy};
use restartwatch::fs::mock::MockFileSystem;
use restartwatch::fs::FileSystem;
use restartwatch::store::SignalStore;
use restartwatch::watch::SignalEvent;

type TestResult = Result<(), Box<dyn Error>>;

fn signal_in(dir: &Path, name: &str, content: &str) -> SignalEvent {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    SignalEvent {
        path,
        watched_dir: dir.to_path_buf(),
    }
}

#[test]
fn preset_argument_embeds_name_verbatim() {
    assert_eq!(preset_argument("presetA"), "--preset=\"presetA\"");
    assert_eq!(preset_argument(""), "--preset=\"\"");
    assert_eq!(preset_argument("a\"b"), "--preset=\"a\"b\"");
}

#[tokio::test]
async fn whitespace_is_trimmed_before_launch() -> TestResult {
    init_tracing();
    let install = InstallBuilder::new().preset("presetA").build();
    let launcher = FakeLauncher::new();
    let mut handler = RestartHandler::new(
        install.supervisor(launcher.clone()),
        install.store(),
        install.layout().server_executable(),
        install.settle(),
    );

    let signal = signal_in(&install.restart_dir(), "x.asrestart", "  presetA\n");
    let outcome = handler.handle(&signal).await?;

    assert_eq!(launcher.arguments(), vec!["--preset=\"presetA\"".to_string()]);
    assert_eq!(
        launcher.launches()[0].executable,
        install.layout().server_executable()
    );
    match outcome {
        CycleOutcome::Restarted { preset, pid } => {
            assert_eq!(preset, "presetA");
            assert_eq!(pid, handler.supervisor().current_pid());
        }
        other => panic!("expected Restarted, got {:?}", other),
    }
    assert!(!signal.path.exists(), "signal must be consumed");
    Ok(())
}

#[tokio::test]
async fn empty_signal_passes_empty_preset_and_is_deleted() -> TestResult {
    init_tracing();
    let install = InstallBuilder::new().build();
    let launcher = FakeLauncher::new();
    let mut handler = RestartHandler::new(
        install.supervisor(launcher.clone()),
        install.store(),
        install.layout().server_executable(),
        install.settle(),
    );

    let signal = signal_in(&install.restart_dir(), "empty.asrestart", "   \n");
    let outcome = handler.handle(&signal).await?;

    assert_eq!(launcher.arguments(), vec!["--preset=\"\"".to_string()]);
    assert!(matches!(outcome, CycleOutcome::Restarted { ref preset, .. } if preset.is_empty()));
    assert!(!signal.path.exists());
    Ok(())
}

#[tokio::test]
async fn second_signal_stops_the_first_process() -> TestResult {
    init_tracing();
    let install = InstallBuilder::new().preset("A").preset("B").build();
    let launcher = FakeLauncher::new();
    let mut handler = RestartHandler::new(
        install.supervisor(launcher.clone()),
        install.store(),
        install.layout().server_executable(),
        install.settle(),
    );

    let first = signal_in(&install.restart_dir(), "one.asrestart", "A");
    handler.handle(&first).await?;
    let second = signal_in(&install.preset_restart_dir("B"), "two.asrestart", "B");
    handler.handle(&second).await?;

    let launches = launcher.launches();
    assert_eq!(launches.len(), 2);
    assert_eq!(launcher.kill_calls(), 1);
    assert_eq!(launcher.alive(), vec![launches[1].pid]);
    assert_eq!(launcher.peak_alive(), 1);
    assert_eq!(handler.supervisor().current_pid(), Some(launches[1].pid));
    Ok(())
}

#[tokio::test]
async fn already_consumed_signal_is_skipped_without_stopping() -> TestResult {
    init_tracing();
    let install = InstallBuilder::new().preset("A").build();
    let launcher = FakeLauncher::new();
    let mut handler = RestartHandler::new(
        install.supervisor(launcher.clone()),
        install.store(),
        install.layout().server_executable(),
        install.settle(),
    );

    let signal = signal_in(&install.restart_dir(), "dup.asrestart", "A");
    handler.handle(&signal).await?;
    let again = handler.handle(&signal).await?;

    assert_eq!(again, CycleOutcome::Skipped);
    assert_eq!(launcher.launches().len(), 1);
    assert_eq!(launcher.kill_calls(), 0);
    assert_eq!(launcher.alive().len(), 1);
    Ok(())
}

#[tokio::test]
async fn launch_failure_after_stop_leaves_no_process() -> TestResult {
    init_tracing();
    let install = InstallBuilder::new().preset("A").build();
    let launcher = FakeLauncher::new();
    let mut handler = RestartHandler::new(
        install.supervisor(launcher.clone()),
        install.store(),
        install.layout().server_executable(),
        install.settle(),
    );

    handler
        .handle(&signal_in(&install.restart_dir(), "a.asrestart", "A"))
        .await?;

    launcher.set_fail_launches(true);
    let signal = signal_in(&install.restart_dir(), "b.asrestart", "A");
    match handler.handle(&signal).await {
        Err(RestartError::Launch { .. }) => {}
        other => panic!("expected Launch error, got {:?}", other),
    }

    assert!(launcher.alive().is_empty());
    assert!(!handler.supervisor().has_current());
    assert!(!signal.path.exists(), "signal was consumed before the launch");
    Ok(())
}

#[tokio::test]
async fn termination_timeout_aborts_cycle_and_keeps_signal() -> TestResult {
    init_tracing();
    let install = InstallBuilder::new().preset("A").build();
    let launcher = FakeLauncher::new();
    launcher.set_stubborn(true);
    let mut handler = RestartHandler::new(
        install.supervisor(launcher.clone()),
        install.store(),
        install.layout().server_executable(),
        install.settle(),
    );

    handler
        .handle(&signal_in(&install.restart_dir(), "a.asrestart", "A"))
        .await?;

    let signal = signal_in(&install.restart_dir(), "b.asrestart", "A");
    assert!(matches!(
        handler.handle(&signal).await,
        Err(RestartError::TerminationTimeout { .. })
    ));
    assert_eq!(launcher.launches().len(), 1);
    assert!(signal.path.exists());
    Ok(())
}

fn handler_over(fs: &MockFileSystem, launcher: &FakeLauncher) -> RestartHandler<FakeLauncher> {
    RestartHandler::new(
        ProcessSupervisor::new(launcher.clone(), TerminationPolicy::default()),
        SignalStore::new(Arc::new(fs.clone())),
        "AssettoServer",
        Duration::ZERO,
    )
}

fn mock_signal(path: &str) -> SignalEvent {
    SignalEvent {
        path: PathBuf::from(path),
        watched_dir: PathBuf::from("cfg/restart"),
    }
}

#[tokio::test]
async fn failed_delete_still_starts_with_the_preset_read() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("cfg/restart/a.asrestart", b"presetA\n".to_vec());
    fs.lock_file("cfg/restart/a.asrestart");
    let launcher = FakeLauncher::new();
    let mut handler = handler_over(&fs, &launcher);

    let outcome = handler.handle(&mock_signal("cfg/restart/a.asrestart")).await?;

    match outcome {
        CycleOutcome::Restarted { preset, pid } => {
            assert_eq!(preset, "presetA");
            assert_eq!(pid, Some(launcher.launches()[0].pid));
        }
        other => panic!("expected Restarted, got {:?}", other),
    }
    assert_eq!(launcher.arguments(), vec!["--preset=\"presetA\"".to_string()]);
    assert!(fs.contents("cfg/restart/a.asrestart").is_some());
    Ok(())
}

#[tokio::test]
async fn undeletable_signal_restarts_only_once() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("cfg/restart/a.asrestart", b"presetA".to_vec());
    fs.lock_file("cfg/restart/a.asrestart");
    let launcher = FakeLauncher::new();
    let mut handler = handler_over(&fs, &launcher);
    let signal = mock_signal("cfg/restart/a.asrestart");

    let first = handler.handle(&signal).await?;
    let second = handler.handle(&signal).await?;

    assert!(matches!(first, CycleOutcome::Restarted { .. }));
    assert_eq!(second, CycleOutcome::Skipped);
    assert_eq!(launcher.launches().len(), 1);
    assert_eq!(launcher.kill_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn name_is_usable_again_once_the_stuck_signal_is_gone() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("cfg/restart/a.asrestart", b"presetA".to_vec());
    fs.lock_file("cfg/restart/a.asrestart");
    let launcher = FakeLauncher::new();
    let mut handler = handler_over(&fs, &launcher);
    let signal = mock_signal("cfg/restart/a.asrestart");

    handler.handle(&signal).await?;

    // Someone clears the file by hand; the next event sees it gone.
    fs.unlock_file("cfg/restart/a.asrestart");
    fs.remove_file(Path::new("cfg/restart/a.asrestart"))?;
    assert_eq!(handler.handle(&signal).await?, CycleOutcome::Skipped);

    fs.add_file("cfg/restart/a.asrestart", b"presetB".to_vec());
    let outcome = handler.handle(&signal).await?;

    assert!(matches!(outcome, CycleOutcome::Restarted { ref preset, .. } if preset == "presetB"));
    assert_eq!(launcher.launches().len(), 2);
    assert_eq!(launcher.kill_calls(), 1);
    assert_eq!(launcher.peak_alive(), 1);
    assert!(fs.contents("cfg/restart/a.asrestart").is_none());
    Ok(())
}
