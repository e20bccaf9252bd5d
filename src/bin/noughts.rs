//! noughts CLI - Q-learning and exact minimax for tic-tac-toe
//!
//! Subcommands:
//! - `train` a Q-learning agent against a fixed opponent
//! - `self-play` two agents against each other
//! - `analyze` saved policies against minimax
//! - `matchup` any two players over many games
//! - `play` an interactive game

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use noughts::cli::commands::{analyze, matchup, play, self_play, train};

#[derive(Parser)]
#[command(name = "noughts")]
#[command(version, about = "Tabular Q-learning and minimax for tic-tac-toe", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a Q-learning agent against an opponent
    Train(Box<train::TrainArgs>),

    /// Train two Q-learning agents against each other
    SelfPlay(Box<self_play::SelfPlayArgs>),

    /// Compare saved policies with minimax
    Analyze(analyze::AnalyzeArgs),

    /// Play two participants against each other
    Matchup(matchup::MatchupArgs),

    /// Play a game from the terminal
    Play(play::PlayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Train(args) => train::execute(*args),
        Commands::SelfPlay(args) => self_play::execute(*args),
        Commands::Analyze(args) => analyze::execute(args),
        Commands::Matchup(args) => matchup::execute(args),
        Commands::Play(args) => play::execute(args),
    }
}
