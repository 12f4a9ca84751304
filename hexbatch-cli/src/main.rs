//! HEXBATCH CLI - Command-line driver for the batched Hex engine
//!
//! Commands:
//! - benchmark: Measure simulation throughput
//! - play: Random self-play with win statistics
//! - solitaire: Random agent against a built-in opponent

mod benchmark;
mod env_args;
mod play;
mod solitaire;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexbatch")]
#[command(about = "Batched Hex simulation engine")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure samples per second of random play
    Benchmark(benchmark::BenchmarkArgs),
    /// Play random games and report win rates
    Play(play::PlayArgs),
    /// Random agent against a built-in opponent
    Solitaire(solitaire::SolitaireArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Benchmark(args) => benchmark::run(args, cli.seed),
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Solitaire(args) => solitaire::run(args, cli.seed),
    }
}
