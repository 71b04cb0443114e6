//! CLI subcommand implementations.

pub mod restart;
pub mod targets;
