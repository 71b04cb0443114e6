//! `vigil targets` — show configured restart targets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use crate::config::{scenario_path, ScenarioConfig};

/// Arguments for `vigil targets`.
#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Path to the scenario YAML (defaults to ~/.vigil/scenario.yaml).
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct TargetTableRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "host")]
    host: String,
    #[tabled(rename = "process")]
    process: String,
    #[tabled(rename = "health port")]
    health_port: u16,
    #[tabled(rename = "poll interval")]
    poll_interval: String,
    #[tabled(rename = "poll timeout")]
    poll_timeout: String,
}

impl TargetsArgs {
    pub fn run(self) -> Result<()> {
        let path = scenario_path(self.scenario.as_deref())?;
        let config = ScenarioConfig::load(&path)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&config.targets)
                    .context("failed to serialize targets JSON")?
            );
            return Ok(());
        }

        println!(
            "Vigil v{} | scenario {} | {} target(s)",
            env!("CARGO_PKG_VERSION"),
            path.display(),
            config.targets.len(),
        );
        if config.targets.is_empty() {
            println!("No targets configured.");
            return Ok(());
        }

        let rows: Vec<TargetTableRow> = config
            .targets
            .iter()
            .map(|target| TargetTableRow {
                name: target.name.clone(),
                host: target.host.clone(),
                process: target.process.clone(),
                health_port: target.health_port,
                poll_interval: format!("{}s", target.poll_interval_secs),
                poll_timeout: format!("{}s", target.poll_timeout_secs),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
