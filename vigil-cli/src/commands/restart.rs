//! `vigil restart|wait|kill` — drive daemon lifecycle phases over ssh.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tokio::runtime::Runtime;

use vigil_remote::restart::DaemonRestarter;

use crate::config::{scenario_path, ScenarioConfig, TargetConfig};

/// Arguments for `vigil restart`.
#[derive(Args, Debug)]
pub struct RestartArgs {
    /// Path to the scenario YAML (defaults to ~/.vigil/scenario.yaml).
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Restrict to a single named target.
    #[arg(long)]
    pub target: Option<String>,

    /// Verified restart cycles to run per target.
    #[arg(long, default_value_t = 1)]
    pub cycles: u32,
}

/// Arguments for `vigil wait`.
#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Path to the scenario YAML (defaults to ~/.vigil/scenario.yaml).
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Restrict to a single named target.
    #[arg(long)]
    pub target: Option<String>,
}

/// Arguments for `vigil kill`.
#[derive(Args, Debug)]
pub struct KillArgs {
    /// Path to the scenario YAML (defaults to ~/.vigil/scenario.yaml).
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Restrict to a single named target.
    #[arg(long)]
    pub target: Option<String>,
}

impl RestartArgs {
    pub fn run(self) -> Result<()> {
        let targets = load_targets(self.scenario.as_deref(), self.target.as_deref())?;
        let runtime = runtime()?;

        let mut failures = 0usize;
        for target in &targets {
            let restarter = restarter(target);
            for cycle in 1..=self.cycles {
                match runtime.block_on(restarter.restart()) {
                    Ok(()) => println!(
                        "{} {} cycle {cycle}/{}",
                        "OK".green().bold(),
                        restarter.target(),
                        self.cycles,
                    ),
                    Err(err) => {
                        failures += 1;
                        println!(
                            "{} {} cycle {cycle}/{}: {err}",
                            "FAILED".red().bold(),
                            restarter.target(),
                            self.cycles,
                        );
                    }
                }
            }
        }

        if failures > 0 {
            bail!("{failures} restart cycle(s) failed");
        }
        println!(
            "{} {} target(s), {} cycle(s) each",
            "all restarts verified".green(),
            targets.len(),
            self.cycles,
        );
        Ok(())
    }
}

impl WaitArgs {
    pub fn run(self) -> Result<()> {
        let targets = load_targets(self.scenario.as_deref(), self.target.as_deref())?;
        let runtime = runtime()?;

        for target in &targets {
            let restarter = restarter(target);
            runtime
                .block_on(restarter.wait_up())
                .with_context(|| format!("'{}' never became healthy", target.name))?;
            println!("{} {}", "HEALTHY".green().bold(), restarter.target());
        }
        Ok(())
    }
}

impl KillArgs {
    pub fn run(self) -> Result<()> {
        let targets = load_targets(self.scenario.as_deref(), self.target.as_deref())?;
        let runtime = runtime()?;

        for target in &targets {
            let restarter = restarter(target);
            runtime
                .block_on(restarter.kill())
                .with_context(|| format!("failed to issue kill for '{}'", target.name))?;
            println!("{} {}", "KILLED".yellow().bold(), restarter.target());
        }
        Ok(())
    }
}

fn restarter(target: &TargetConfig) -> DaemonRestarter<vigil_remote::exec::SshExec> {
    DaemonRestarter::new(Arc::new(target.ssh_exec()), target.restart_target())
}

fn load_targets(scenario: Option<&std::path::Path>, name: Option<&str>) -> Result<Vec<TargetConfig>> {
    let path = scenario_path(scenario)?;
    let config = ScenarioConfig::load(&path)?;
    select_targets(config, name)
}

fn select_targets(config: ScenarioConfig, name: Option<&str>) -> Result<Vec<TargetConfig>> {
    if config.targets.is_empty() {
        bail!("scenario config defines no targets");
    }

    let Some(name) = name else {
        return Ok(config.targets);
    };

    let selected: Vec<TargetConfig> = config
        .targets
        .into_iter()
        .filter(|target| target.name == name)
        .collect();
    if selected.is_empty() {
        bail!("no target named '{name}' in scenario config");
    }
    Ok(selected)
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(names: &[&str]) -> ScenarioConfig {
        ScenarioConfig {
            targets: names
                .iter()
                .map(|name| TargetConfig {
                    name: name.to_string(),
                    host: format!("{name}-host"),
                    process: name.to_string(),
                    health_port: 10250,
                    user: None,
                    ssh_port: 22,
                    poll_interval_secs: 5,
                    poll_timeout_secs: 600,
                })
                .collect(),
        }
    }

    #[test]
    fn select_all_targets_without_filter() {
        let selected = select_targets(config_with(&["a", "b"]), None).expect("select");
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn select_single_named_target() {
        let selected = select_targets(config_with(&["a", "b"]), Some("b")).expect("select");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "b");
    }

    #[test]
    fn unknown_target_name_is_rejected() {
        let err = select_targets(config_with(&["a"]), Some("zzz")).expect_err("unknown");
        assert!(err.to_string().contains("zzz"));
    }

    #[test]
    fn empty_scenario_is_rejected() {
        let err = select_targets(config_with(&[]), None).expect_err("empty");
        assert!(err.to_string().contains("no targets"));
    }
}
