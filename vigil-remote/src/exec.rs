//! Remote command execution seam.
//!
//! [`SshExec`] reaches a daemon's node over ssh; [`LocalExec`] runs the same
//! commands through `sh -c` for scenarios where the harness runs on the node
//! itself. Both capture exit code, stdout, and stderr.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use vigil_core::types::HostName;

use crate::error::ExecError;

/// Captured result of one remote command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Executes a shell command on a named host.
#[async_trait]
pub trait RemoteExec: Send + Sync {
    async fn execute(&self, host: &HostName, command: &str) -> Result<ExecOutput, ExecError>;
}

/// ssh-based executor. Non-interactive: `BatchMode` so a missing key fails
/// fast instead of prompting.
#[derive(Debug, Clone)]
pub struct SshExec {
    pub user: Option<String>,
    pub port: u16,
}

impl Default for SshExec {
    fn default() -> Self {
        Self {
            user: None,
            port: 22,
        }
    }
}

impl SshExec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn destination(&self, host: &HostName) -> String {
        match &self.user {
            Some(user) => format!("{user}@{host}"),
            None => host.to_string(),
        }
    }
}

#[async_trait]
impl RemoteExec for SshExec {
    async fn execute(&self, host: &HostName, command: &str) -> Result<ExecOutput, ExecError> {
        let output = Command::new("ssh")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg("StrictHostKeyChecking=no")
            .arg("-p")
            .arg(self.port.to_string())
            .arg(self.destination(host))
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                host: host.to_string(),
                source,
            })?;

        Ok(capture(output))
    }
}

/// Same-host executor: runs the command through `sh -c`, ignoring the host
/// argument. Useful when the harness runs on the node under test.
#[derive(Debug, Clone, Default)]
pub struct LocalExec;

#[async_trait]
impl RemoteExec for LocalExec {
    async fn execute(&self, host: &HostName, command: &str) -> Result<ExecOutput, ExecError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                host: host.to_string(),
                source,
            })?;

        Ok(capture(output))
    }
}

fn capture(output: std::process::Output) -> ExecOutput {
    ExecOutput {
        // Terminated-by-signal has no exit code; fold it into a failure.
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
