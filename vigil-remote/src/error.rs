//! Error types for vigil-remote.

use std::time::Duration;

use thiserror::Error;

/// Transport-level failure: the remote command could not be attempted at
/// all. A command that ran and exited non-zero is not an `ExecError`; it is
/// a successful execution with a non-zero exit code.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to run remote command on {host}: {source}")]
    Spawn {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

/// Error surface for health polling and restart cycles.
#[derive(Debug, Error)]
pub enum RestartError {
    /// The daemon failed to report healthy within the polling bound.
    #[error("{target} did not report healthy within {timeout:?}")]
    HealthTimeout { target: String, timeout: Duration },

    /// Transport failure outside the retried health-poll path (e.g. the
    /// kill command could not be issued at all).
    #[error("remote execution failed: {0}")]
    Exec(#[from] ExecError),
}
