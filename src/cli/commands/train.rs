//! Train command - Train a Q-learning agent against a fixed opponent

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    cli::{
        config::{CommonArgs, HyperparameterArgs, OpponentSpec},
        output::{format_number, print_kv, print_section, print_training_report},
    },
    config::TrainingConfig,
    q_learning::QLearningAgent,
    training::TrainingPipeline,
};

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent as X against an opponent")]
pub struct TrainArgs {
    /// Opponent playing O (minimax, random, buggy, buggy2)
    #[arg(long, short = 'o', default_value = "minimax")]
    pub opponent: OpponentSpec,

    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 100_000)]
    pub episodes: usize,

    /// Where to write the learned policy
    #[arg(long, default_value = "q_policy.bin")]
    pub output: PathBuf,

    /// Continue from an existing policy file instead of an empty table
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Log a progress line every N episodes (0 disables)
    #[arg(long, default_value_t = 1000)]
    pub log_every: usize,

    #[command(flatten)]
    pub hyperparameters: HyperparameterArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    if !args.opponent.is_trainable_against() {
        bail!(
            "Unknown opponent '{}'. Supported: minimax, random, buggy, buggy2",
            args.opponent
        );
    }

    let params = args.hyperparameters.to_hyperparameters()?;
    let mut agent = QLearningAgent::new(params)?;
    if let Some(seed) = args.common.seed {
        agent.reseed(seed);
    }
    if let Some(path) = &args.resume {
        let count = agent
            .load_policy(path)
            .with_context(|| format!("Failed to resume from {}", path.display()))?;
        println!("Resumed {} entries from {}", format_number(count), path.display());
    }

    let mut opponent = args.opponent.build(args.common.seed)?;

    print_section("Q-Learning Training");
    print_kv("Opponent", opponent.name());
    print_kv("Episodes", &format_number(args.episodes));
    print_kv("Learning rate", &params.learning_rate.to_string());
    print_kv("Discount", &params.discount.to_string());
    print_kv("Epsilon", &params.epsilon.to_string());
    if let Some(seed) = args.common.seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut config = TrainingConfig::new(args.episodes)
        .with_progress(!args.common.no_progress)
        .with_log_every(args.log_every);
    if let Some(seed) = args.common.seed {
        config = config.with_seed(seed);
    }

    let report = TrainingPipeline::new(config).train_against(&mut agent, opponent.as_mut())?;

    print_section("Training Complete");
    print_training_report(&report);

    agent
        .save_policy(&args.output)
        .with_context(|| format!("Failed to save policy to {}", args.output.display()))?;
    println!("\nPolicy saved to: {}", args.output.display());
    Ok(())
}
