//! qlearn CLI - Tabular Q-learning toolkit
//!
//! This CLI provides a unified interface for:
//! - Training agents in the bundled grid world and knight's tour environments
//! - Replaying the greedy policy of a saved Q-table
//! - Inspecting saved Q-tables

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qlearn")]
#[command(version, about = "Tabular Q-learning toolkit", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a Q-learning agent
    Train(Box<qlearn::cli::commands::train::TrainArgs>),

    /// Follow a saved Q-table greedily
    Rollout(qlearn::cli::commands::rollout::RolloutArgs),

    /// Summarize a saved Q-table
    Inspect(qlearn::cli::commands::inspect::InspectArgs),
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Train(args) => qlearn::cli::commands::train::execute(*args),
        Commands::Rollout(args) => qlearn::cli::commands::rollout::execute(args),
        Commands::Inspect(args) => qlearn::cli::commands::inspect::execute(args),
    }
}
