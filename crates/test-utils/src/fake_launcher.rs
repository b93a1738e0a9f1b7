use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use restartwatch::errors::{RestartError, Result};
use restartwatch::exec::{ManagedChild, ProcessLauncher};

/// One recorded call to `launch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub executable: PathBuf,
    pub argument: String,
    pub pid: u32,
}

#[derive(Debug, Default)]
struct FakeState {
    next_pid: u32,
    launches: Vec<Launch>,
    alive: HashSet<u32>,
    peak_alive: usize,
    kill_calls: usize,
    stubborn: bool,
    fail_launches: bool,
}

/// A fake launcher that:
/// - records every launch (executable, argument, pid)
/// - tracks which fake processes are alive and the peak number alive at once
/// - can make new children ignore kills, or make launches fail
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    state: Arc<Mutex<FakeState>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Children launched from now on ignore kill requests.
    pub fn set_stubborn(&self, stubborn: bool) {
        self.state.lock().unwrap().stubborn = stubborn;
    }

    /// Launches from now on fail with `RestartError::Launch`.
    pub fn set_fail_launches(&self, fail: bool) {
        self.state.lock().unwrap().fail_launches = fail;
    }

    pub fn launches(&self) -> Vec<Launch> {
        self.state.lock().unwrap().launches.clone()
    }

    pub fn arguments(&self) -> Vec<String> {
        self.launches().into_iter().map(|l| l.argument).collect()
    }

    pub fn alive(&self) -> Vec<u32> {
        let mut alive: Vec<u32> = self.state.lock().unwrap().alive.iter().copied().collect();
        alive.sort();
        alive
    }

    pub fn peak_alive(&self) -> usize {
        self.state.lock().unwrap().peak_alive
    }

    pub fn kill_calls(&self) -> usize {
        self.state.lock().unwrap().kill_calls
    }

    /// Simulate a process exiting on its own.
    pub fn exit(&self, pid: u32) {
        self.state.lock().unwrap().alive.remove(&pid);
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, executable: &Path, argument: &str) -> Result<Box<dyn ManagedChild>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_launches {
            return Err(RestartError::Launch {
                executable: executable.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "fake launch failure"),
            });
        }

        state.next_pid += 1;
        let pid = 1000 + state.next_pid;
        state.launches.push(Launch {
            executable: executable.to_path_buf(),
            argument: argument.to_string(),
            pid,
        });
        state.alive.insert(pid);
        state.peak_alive = state.peak_alive.max(state.alive.len());

        Ok(Box::new(FakeChild {
            pid,
            stubborn: state.stubborn,
            state: Arc::clone(&self.state),
        }))
    }
}

#[derive(Debug)]
struct FakeChild {
    pid: u32,
    stubborn: bool,
    state: Arc<Mutex<FakeState>>,
}

impl ManagedChild for FakeChild {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn has_exited(&mut self) -> io::Result<bool> {
        Ok(!self.state.lock().unwrap().alive.contains(&self.pid))
    }

    fn start_kill(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.kill_calls += 1;
        if !self.stubborn {
            state.alive.remove(&self.pid);
        }
        Ok(())
    }
}
