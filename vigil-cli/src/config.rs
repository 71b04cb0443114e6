//! Scenario configuration: the restart targets a `vigil` run drives.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use vigil_remote::exec::SshExec;
use vigil_remote::health::RestartTarget;

/// Root of the scenario YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// One daemon to restart and validate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub host: String,
    pub process: String,
    pub health_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario config at {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse scenario config at {}", path.display()))
    }
}

impl TargetConfig {
    pub fn restart_target(&self) -> RestartTarget {
        RestartTarget::new(self.host.as_str(), self.process.as_str(), self.health_port)
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_poll_timeout(Duration::from_secs(self.poll_timeout_secs))
    }

    pub fn ssh_exec(&self) -> SshExec {
        let exec = SshExec::new().with_port(self.ssh_port);
        match &self.user {
            Some(user) => exec.with_user(user.clone()),
            None => exec,
        }
    }
}

/// Explicit path if given, otherwise `~/.vigil/scenario.yaml`.
pub fn scenario_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".vigil").join("scenario.yaml"))
}

fn default_ssh_port() -> u16 {
    22
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_poll_timeout_secs() -> u64 {
    600
}
