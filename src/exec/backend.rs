// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The supervisor talks to a `ProcessLauncher` instead of spawning processes
//! directly. Production code uses [`RealProcessLauncher`]; tests provide a
//! fake that records launches and simulates kills without touching the OS.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{Result, RestartError};

/// A launched process as seen by the supervisor.
pub trait ManagedChild: Send + fmt::Debug {
    /// OS process id, captured at launch.
    fn id(&self) -> Option<u32>;

    /// Non-blocking check whether the process has exited.
    fn has_exited(&mut self) -> io::Result<bool>;

    /// Issue a hard kill without waiting for the process to go away.
    fn start_kill(&mut self) -> io::Result<()>;
}

/// Trait abstracting how the managed server gets started.
pub trait ProcessLauncher: Send + Sync + 'static {
    /// Launch `executable` with `argument` as one unsplit argument string.
    fn launch(&self, executable: &Path, argument: &str) -> Result<Box<dyn ManagedChild>>;
}

/// Launcher that spawns real, detached OS processes.
///
/// The child runs in `working_dir` with inherited stdio. It is not tied to
/// the supervisor's lifetime: dropping the handle does not kill it.
#[derive(Debug, Clone)]
pub struct RealProcessLauncher {
    working_dir: PathBuf,
}

impl RealProcessLauncher {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

impl ProcessLauncher for RealProcessLauncher {
    fn launch(&self, executable: &Path, argument: &str) -> Result<Box<dyn ManagedChild>> {
        if !executable.is_file() {
            return Err(RestartError::Launch {
                executable: executable.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "executable not found"),
            });
        }

        let mut cmd = Command::new(executable);
        push_argument(&mut cmd, argument);
        cmd.current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(false);
        detach(&mut cmd);

        let child = cmd.spawn().map_err(|source| RestartError::Launch {
            executable: executable.to_path_buf(),
            source,
        })?;

        let pid = child.id();
        debug!(?pid, ?executable, %argument, "spawned server process");

        Ok(Box::new(RealChild { pid, child }))
    }
}

// Windows would re-quote a normal argument; the argument string already
// carries its own quotes, so it is appended as-is.
#[cfg(windows)]
fn push_argument(cmd: &mut Command, argument: &str) {
    cmd.raw_arg(argument);
}

#[cfg(not(windows))]
fn push_argument(cmd: &mut Command, argument: &str) {
    cmd.arg(argument);
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
    cmd.creation_flags(CREATE_NEW_CONSOLE);
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    // Own process group: Ctrl-C on the supervisor's terminal does not reach it.
    cmd.process_group(0);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut Command) {}

struct RealChild {
    pid: Option<u32>,
    child: tokio::process::Child,
}

impl fmt::Debug for RealChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealChild").field("pid", &self.pid).finish()
    }
}

impl ManagedChild for RealChild {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    fn has_exited(&mut self) -> io::Result<bool> {
        Ok(self.child.try_wait()?.is_some())
    }

    fn start_kill(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }
}
