//! Vigil — verify control-plane daemons recover cleanly across restarts.
//!
//! # Usage
//!
//! ```text
//! vigil targets [--scenario <path>] [--json]
//! vigil restart [--scenario <path>] [--target <name>] [--cycles <n>]
//! vigil wait [--scenario <path>] [--target <name>]
//! vigil kill [--scenario <path>] [--target <name>]
//! ```

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::restart::{KillArgs, RestartArgs, WaitArgs};
use commands::targets::TargetsArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "vigil",
    version,
    about = "Force control-plane daemon restarts and verify clean recovery",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show restart targets configured in the scenario.
    Targets(TargetsArgs),

    /// Run verified restart cycles (health, kill, health) per target.
    Restart(RestartArgs),

    /// Poll a target's health endpoint until it reports healthy.
    Wait(WaitArgs),

    /// Send a best-effort terminate to a target's daemon process.
    Kill(KillArgs),
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Targets(args) => args.run(),
        Commands::Restart(args) => args.run(),
        Commands::Wait(args) => args.run(),
        Commands::Kill(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
