//! Self-play command - Train two Q-learning agents against each other

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        config::{CommonArgs, HyperparameterArgs},
        output::{format_number, print_kv, print_match_report, print_section},
    },
    config::TrainingConfig,
    opponents::PolicyOpponent,
    q_learning::QLearningAgent,
    training::TrainingPipeline,
};

#[derive(Parser, Debug)]
#[command(about = "Train two Q-learning agents by self-play")]
pub struct SelfPlayArgs {
    /// Number of self-play training episodes
    #[arg(long, short = 'e', default_value_t = 100_000)]
    pub episodes: usize,

    /// Greedy evaluation games to play after training
    #[arg(long, default_value_t = 1000)]
    pub eval_games: usize,

    /// Where to write the X agent's policy
    #[arg(long, default_value = "q_policy_x.bin")]
    pub output_x: PathBuf,

    /// Where to write the O agent's policy
    #[arg(long, default_value = "q_policy_o.bin")]
    pub output_o: PathBuf,

    /// Log a progress line every N episodes (0 disables)
    #[arg(long, default_value_t = 1000)]
    pub log_every: usize,

    #[command(flatten)]
    pub hyperparameters: HyperparameterArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: SelfPlayArgs) -> Result<()> {
    let params = args.hyperparameters.to_hyperparameters()?;
    let mut agent_x = QLearningAgent::new(params)?;
    let mut agent_o = QLearningAgent::new(params)?;

    print_section("Self-Play Q-Learning");
    print_kv("Episodes", &format_number(args.episodes));
    print_kv("Learning rate", &params.learning_rate.to_string());
    print_kv("Discount", &params.discount.to_string());
    print_kv("Epsilon", &params.epsilon.to_string());

    let config = |games: usize| {
        let config = TrainingConfig::new(games)
            .with_progress(!args.common.no_progress)
            .with_log_every(args.log_every);
        match args.common.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    };

    let training = TrainingPipeline::new(config(args.episodes))
        .train_self_play(&mut agent_x, &mut agent_o)?;
    print_section("Self-Play Training Complete");
    print_match_report(&training, "agent X", "agent O");

    agent_x
        .save_policy(&args.output_x)
        .with_context(|| format!("Failed to save policy to {}", args.output_x.display()))?;
    agent_o
        .save_policy(&args.output_o)
        .with_context(|| format!("Failed to save policy to {}", args.output_o.display()))?;
    println!("\nPolicies saved to: {} and {}", args.output_x.display(), args.output_o.display());

    if args.eval_games > 0 {
        let mut x = PolicyOpponent::new(agent_x.into_table(), "agent X");
        let mut o = PolicyOpponent::new(agent_o.into_table(), "agent O");
        let evaluation = TrainingPipeline::new(config(args.eval_games).with_log_every(0))
            .play_match(&mut x, &mut o)?;
        print_section("Greedy Evaluation");
        print_match_report(&evaluation, "agent X", "agent O");
    }
    Ok(())
}
