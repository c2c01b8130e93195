//! Chexers CLI - Command-line interface
//!
//! Commands:
//! - play: Self-play games between three agents
//! - solve: Plan a single colour's exit from a JSON board

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chexers_cli::{play_cmd, solve_cmd};

#[derive(Parser)]
#[command(name = "chexers")]
#[command(about = "Three-player Chexers agent engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Self-play games between three agents
    Play(play_cmd::PlayArgs),
    /// Plan a single colour's exit from a JSON board
    Solve(solve_cmd::SolveArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args),
        Commands::Solve(args) => solve_cmd::run(args),
    }
}
