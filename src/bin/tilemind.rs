//! tilemind CLI - train and inspect a Q-learning agent for the 4x4 tile puzzle
//!
//! - Training with resumable, versioned value tables
//! - Greedy evaluation of a stored table, optionally against random play
//! - Inspection of table contents

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

#[derive(Parser)]
#[command(name = "tilemind")]
#[command(version, about = "Q-learning agent for the 4x4 sliding-tile puzzle", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a Q-learning agent, resuming from a stored table
    Train(Box<tilemind::cli::commands::train::TrainArgs>),

    /// Play greedily with a stored table
    Evaluate(tilemind::cli::commands::evaluate::EvaluateArgs),

    /// Show statistics and values of a stored table
    Inspect(tilemind::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => tilemind::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => tilemind::cli::commands::evaluate::execute(args),
        Commands::Inspect(args) => tilemind::cli::commands::inspect::execute(args),
    }
}
