// src/exec/supervisor.rs

//! Ownership of the single managed server process.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::TerminationSection;
use crate::errors::{Result, RestartError};
use crate::exec::backend::{ManagedChild, ProcessLauncher};

/// Bounds on the hard-kill loop in [`ProcessSupervisor::stop`].
#[derive(Debug, Clone, Copy)]
pub struct TerminationPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::from(&TerminationSection::default())
    }
}

impl From<&TerminationSection> for TerminationPolicy {
    fn from(section: &TerminationSection) -> Self {
        Self {
            max_attempts: section.max_kill_attempts.max(1),
            backoff: Duration::from_millis(section.kill_backoff_ms),
        }
    }
}

/// Holds at most one "current" server process.
///
/// `start` refuses to run while a process is current; callers stop the old
/// one first. This keeps "zero or one managed process" true by construction.
pub struct ProcessSupervisor<L: ProcessLauncher> {
    launcher: L,
    policy: TerminationPolicy,
    current: Option<Box<dyn ManagedChild>>,
}

impl<L: ProcessLauncher> fmt::Debug for ProcessSupervisor<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("policy", &self.policy)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher> ProcessSupervisor<L> {
    pub fn new(launcher: L, policy: TerminationPolicy) -> Self {
        Self {
            launcher,
            policy,
            current: None,
        }
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Pid of the current process, if one is held (it may have exited on
    /// its own since).
    pub fn current_pid(&self) -> Option<u32> {
        self.current.as_ref().and_then(|c| c.id())
    }

    /// Launch the server and record it as current. Returns its pid.
    pub fn start(&mut self, executable: &Path, argument: &str) -> Result<Option<u32>> {
        if let Some(existing) = &self.current {
            return Err(RestartError::AlreadyRunning(existing.id()));
        }

        let child = self.launcher.launch(executable, argument)?;
        let pid = child.id();
        self.current = Some(child);
        Ok(pid)
    }

    /// Forcibly terminate the current process and forget it.
    ///
    /// - No current process: `NoActiveProcess`.
    /// - Process refuses to die within the policy: `TerminationTimeout`; the
    ///   handle stays current so nothing else gets launched next to it.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(mut child) = self.current.take() else {
            return Err(RestartError::NoActiveProcess);
        };

        match terminate(child.as_mut(), &self.policy).await {
            Ok(()) => {
                info!(pid = ?child.id(), "server process stopped");
                Ok(())
            }
            Err(err) => {
                self.current = Some(child);
                Err(err)
            }
        }
    }
}

/// Kill, check, back off; repeat until the process is gone or the attempt
/// budget runs out.
async fn terminate(child: &mut dyn ManagedChild, policy: &TerminationPolicy) -> Result<()> {
    let pid = child.id();

    for attempt in 1..=policy.max_attempts {
        if child.has_exited()? {
            debug!(?pid, attempt, "process has exited");
            return Ok(());
        }

        if let Err(err) = child.start_kill() {
            debug!(?pid, attempt, error = %err, "kill attempt failed");
        }

        tokio::time::sleep(policy.backoff).await;
    }

    if child.has_exited()? {
        return Ok(());
    }

    warn!(?pid, attempts = policy.max_attempts, "process refused to terminate");
    Err(RestartError::TerminationTimeout {
        pid,
        attempts: policy.max_attempts,
    })
}
