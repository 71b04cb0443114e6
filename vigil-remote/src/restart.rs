//! Verified restart cycles for a remote daemon.

use std::sync::Arc;

use crate::error::RestartError;
use crate::exec::RemoteExec;
use crate::health::{HealthPoller, RestartTarget};

/// Forces a daemon to restart and confirms it comes back healthy.
///
/// The two phases are exposed separately so a scenario can interleave
/// actions between [`kill`](Self::kill) and the second
/// [`wait_up`](Self::wait_up) — e.g. exercising behavior while the daemon
/// is known to be down.
pub struct DaemonRestarter<E> {
    exec: Arc<E>,
    poller: HealthPoller<E>,
    target: RestartTarget,
}

impl<E: RemoteExec> DaemonRestarter<E> {
    pub fn new(exec: Arc<E>, target: RestartTarget) -> Self {
        Self {
            poller: HealthPoller::new(exec.clone()),
            exec,
            target,
        }
    }

    pub fn target(&self) -> &RestartTarget {
        &self.target
    }

    /// Poll the target's `/healthz` until it answers 200 or the poll
    /// timeout elapses.
    pub async fn wait_up(&self) -> Result<(), RestartError> {
        self.poller.wait_until_healthy(&self.target).await
    }

    /// Send SIGTERM to the daemon process, best-effort. Does not confirm
    /// the process actually died. "No matching process" is non-fatal; the
    /// daemon may already be cycling.
    pub async fn kill(&self) -> Result<(), RestartError> {
        tracing::info!(target = %self.target, "killing daemon process");
        let command = format!("pgrep {} | xargs -r kill", self.target.process);
        let result = self.exec.execute(&self.target.host, &command).await?;
        if !result.success() {
            tracing::debug!(
                target = %self.target,
                exit_code = result.code,
                stderr = %result.stderr,
                "kill matched no running process",
            );
        }
        Ok(())
    }

    /// Verified restart: confirm healthy, kill, confirm healthy again.
    /// Verifying health before the kill establishes a known-good baseline,
    /// so a later failure to come back is attributable to the restart and
    /// not a pre-existing outage.
    pub async fn restart(&self) -> Result<(), RestartError> {
        self.wait_up().await?;
        self.kill().await?;
        self.wait_up().await
    }
}
