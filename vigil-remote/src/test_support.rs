//! Test doubles shared by the health and restart test modules.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use vigil_core::types::HostName;

use crate::error::ExecError;
use crate::exec::{ExecOutput, RemoteExec};

/// Replays a fixed sequence of per-call results and records every command
/// it was asked to run.
pub(crate) struct ScriptedExec {
    responses: Mutex<VecDeque<Result<ExecOutput, ExecError>>>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedExec {
    pub(crate) fn new(responses: Vec<Result<ExecOutput, ExecError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("commands lock").clone()
    }
}

#[async_trait]
impl RemoteExec for ScriptedExec {
    async fn execute(&self, _host: &HostName, command: &str) -> Result<ExecOutput, ExecError> {
        self.commands
            .lock()
            .expect("commands lock")
            .push(command.to_string());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .expect("scripted exec ran out of responses")
    }
}

pub(crate) fn exit(code: i32, stdout: &str) -> Result<ExecOutput, ExecError> {
    Ok(ExecOutput {
        code,
        stdout: stdout.to_string(),
        stderr: String::new(),
    })
}

pub(crate) fn healthy() -> Result<ExecOutput, ExecError> {
    exit(0, "200")
}

pub(crate) fn refused() -> Result<ExecOutput, ExecError> {
    // curl exit code 7: failed to connect.
    exit(7, "000")
}

pub(crate) fn transport_down() -> Result<ExecOutput, ExecError> {
    Err(ExecError::Spawn {
        host: "master-1".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
    })
}
