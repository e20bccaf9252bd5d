//! Shared configuration types for CLI commands

use std::{fmt, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Args;

use crate::{
    config::Hyperparameters,
    opponents::{Flaw, FlawedOpponent, MinimaxOpponent, PolicyOpponent, RandomOpponent},
    ports::MoveSource,
    q_learning::{QTable, load_snapshot},
};

/// Learning hyperparameter flags
#[derive(Args, Debug, Clone)]
pub struct HyperparameterArgs {
    /// Learning rate α in (0, 1]
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Discount γ in [0, 1]
    #[arg(long, default_value_t = 1.0)]
    pub discount: f64,

    /// Exploration rate ε in [0, 1]
    #[arg(long, default_value_t = 0.2)]
    pub epsilon: f64,
}

impl HyperparameterArgs {
    pub fn to_hyperparameters(&self) -> Result<Hyperparameters> {
        let params = Hyperparameters::new(self.learning_rate, self.discount, self.epsilon);
        params.validate()?;
        Ok(params)
    }
}

/// Flags common to every long-running command
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// A participant named on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpponentSpec {
    Minimax,
    Random,
    Flawed(Flaw),
    /// Greedy play from a saved policy snapshot
    Policy(PathBuf),
}

impl FromStr for OpponentSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "minimax" | "optimal" => OpponentSpec::Minimax,
            "random" => OpponentSpec::Random,
            "buggy" => OpponentSpec::Flawed(Flaw::ColumnLeak),
            "buggy2" => OpponentSpec::Flawed(Flaw::TopRowLeak),
            _ => OpponentSpec::Policy(PathBuf::from(s)),
        })
    }
}

impl fmt::Display for OpponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpponentSpec::Minimax => write!(f, "minimax"),
            OpponentSpec::Random => write!(f, "random"),
            OpponentSpec::Flawed(Flaw::ColumnLeak) => write!(f, "buggy"),
            OpponentSpec::Flawed(Flaw::TopRowLeak) => write!(f, "buggy2"),
            OpponentSpec::Policy(path) => write!(f, "{}", path.display()),
        }
    }
}

impl OpponentSpec {
    /// Build the move source, loading the policy file if there is one
    pub fn build(&self, seed: Option<u64>) -> Result<Box<dyn MoveSource>> {
        let mut source: Box<dyn MoveSource> = match self {
            OpponentSpec::Minimax => Box::new(MinimaxOpponent::new()),
            OpponentSpec::Random => Box::new(RandomOpponent::new()),
            OpponentSpec::Flawed(flaw) => Box::new(FlawedOpponent::new(*flaw)),
            OpponentSpec::Policy(path) => {
                let table = load_policy_table(path)?;
                Box::new(PolicyOpponent::new(table, path.display().to_string()))
            }
        };
        if let Some(seed) = seed {
            source.set_rng_seed(seed);
        }
        Ok(source)
    }

    /// Opponents a learning agent can train against
    pub fn is_trainable_against(&self) -> bool {
        !matches!(self, OpponentSpec::Policy(_))
    }
}

/// Load a snapshot into a table with default hyperparameters
pub fn load_policy_table(path: &std::path::Path) -> Result<QTable> {
    let entries = load_snapshot(path)
        .with_context(|| format!("Failed to load policy from {}", path.display()))?;
    let defaults = Hyperparameters::default();
    Ok(QTable::from_entries(
        entries,
        defaults.learning_rate,
        defaults.discount,
    ))
}
