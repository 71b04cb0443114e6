//! Health polling for a daemon behind a `/healthz` endpoint.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use vigil_core::types::HostName;

use crate::error::RestartError;
use crate::exec::RemoteExec;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Describes how to reach and validate one daemon instance. Immutable once
/// constructed; owned by the restarter that drives it.
#[derive(Debug, Clone)]
pub struct RestartTarget {
    pub host: HostName,
    pub process: String,
    pub health_port: u16,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl RestartTarget {
    pub fn new(host: impl Into<HostName>, process: impl Into<String>, health_port: u16) -> Self {
        Self {
            host: host.into(),
            process: process.into(),
            health_port,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    fn health_probe(&self) -> String {
        format!(
            "curl -s -o /dev/null -I -w \"%{{http_code}}\" http://localhost:{}/healthz",
            self.health_port
        )
    }
}

impl fmt::Display for RestartTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "daemon {} on {}", self.process, self.host)
    }
}

/// Polls a target's `/healthz` until it answers 200 or the timeout elapses.
pub struct HealthPoller<E> {
    exec: Arc<E>,
}

impl<E: RemoteExec> HealthPoller<E> {
    pub fn new(exec: Arc<E>) -> Self {
        Self { exec }
    }

    /// Probe immediately, then every `poll_interval`. A probe succeeds iff
    /// the remote command exits 0 and its stdout parses to HTTP 200.
    /// Transport failures and non-success probes are logged and retried;
    /// the daemon may legitimately be unreachable while restarting.
    pub async fn wait_until_healthy(&self, target: &RestartTarget) -> Result<(), RestartError> {
        let probe = target.health_probe();
        tracing::info!(%target, port = target.health_port, "polling /healthz until 200");

        let deadline = Instant::now() + target.poll_timeout;
        loop {
            match self.exec.execute(&target.host, &probe).await {
                Ok(result) if result.success() => match result.stdout.trim().parse::<u16>() {
                    Ok(200) => {
                        tracing::info!(%target, "daemon reported healthy");
                        return Ok(());
                    }
                    Ok(code) => {
                        tracing::info!(%target, http_code = code, "daemon not healthy yet");
                    }
                    Err(err) => {
                        tracing::warn!(
                            %target,
                            stdout = %result.stdout,
                            error = %err,
                            "unable to parse healthz http code",
                        );
                    }
                },
                Ok(result) => {
                    tracing::info!(
                        %target,
                        exit_code = result.code,
                        stdout = %result.stdout,
                        stderr = %result.stderr,
                        "health probe failed",
                    );
                }
                Err(err) => {
                    tracing::info!(%target, error = %err, "health probe transport failure, retrying");
                }
            }

            if Instant::now() + target.poll_interval > deadline {
                return Err(RestartError::HealthTimeout {
                    target: target.to_string(),
                    timeout: target.poll_timeout,
                });
            }
            tokio::time::sleep(target.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support::{exit, healthy, refused, transport_down, ScriptedExec};

    fn target() -> RestartTarget {
        RestartTarget::new("master-1", "cluster-controller", 10252)
            .with_poll_interval(Duration::from_secs(5))
            .with_poll_timeout(Duration::from_secs(30))
    }

    #[test]
    fn target_display_names_process_and_host() {
        assert_eq!(
            target().to_string(),
            "daemon cluster-controller on master-1"
        );
    }

    #[test]
    fn probe_command_targets_configured_port() {
        assert!(target().health_probe().contains("localhost:10252/healthz"));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_first_200_after_transport_failures() {
        let exec = Arc::new(ScriptedExec::new(vec![
            transport_down(),
            transport_down(),
            healthy(),
        ]));
        let poller = HealthPoller::new(exec);

        let started = Instant::now();
        poller
            .wait_until_healthy(&target())
            .await
            .expect("healthy within the poll timeout");

        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_secs(10) && elapsed <= Duration::from_secs(15),
            "expected success at ~10-15s, got {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn retries_through_non_200_and_unparseable_probes() {
        let exec = Arc::new(ScriptedExec::new(vec![
            refused(),
            exit(0, "503"),
            exit(0, "garbage"),
            healthy(),
        ]));
        let poller = HealthPoller::new(exec);

        poller
            .wait_until_healthy(&target())
            .await
            .expect("eventually healthy");
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_never_healthy() {
        // 30s timeout at 5s interval: probes at 0..=30s, then gives up.
        let exec = Arc::new(ScriptedExec::new((0..7).map(|_| refused()).collect()));
        let poller = HealthPoller::new(exec.clone());

        let started = Instant::now();
        let err = poller
            .wait_until_healthy(&target())
            .await
            .expect_err("must time out");

        match err {
            RestartError::HealthTimeout {
                target: description,
                timeout,
            } => {
                assert_eq!(description, "daemon cluster-controller on master-1");
                assert_eq!(timeout, Duration::from_secs(30));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(started.elapsed(), Duration::from_secs(30));
        assert_eq!(exec.commands().len(), 7);
    }
}
