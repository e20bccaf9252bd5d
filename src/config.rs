//! Configuration types for agents and training runs

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Learning hyperparameters for the tabular agent
///
/// # Examples
///
/// ```
/// use noughts::config::Hyperparameters;
///
/// let params = Hyperparameters::default().with_epsilon(0.0);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.learning_rate, 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Learning rate α, in (0, 1]
    pub learning_rate: f64,
    /// Discount γ, in [0, 1]
    pub discount: f64,
    /// Exploration rate ε, in [0, 1]
    pub epsilon: f64,
}

impl Hyperparameters {
    pub fn new(learning_rate: f64, discount: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            discount,
            epsilon,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Check every parameter lies in its admissible range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperparameter`] naming the first offender.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidHyperparameter {
                name: "learning_rate",
                value: self.learning_rate,
                reason: "must be in (0, 1]",
            });
        }
        check_unit_interval("discount", self.discount)?;
        check_unit_interval("epsilon", self.epsilon)
    }
}

pub(crate) fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidHyperparameter {
            name,
            value,
            reason: "must be in [0, 1]",
        })
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self::new(0.1, 1.0, 0.2)
    }
}

/// Configuration for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of episodes to play
    pub episodes: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Whether to show a progress bar
    pub progress: bool,
    /// Log a summary line every this many episodes (0 disables)
    pub log_every: usize,
}

impl TrainingConfig {
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            seed: None,
            progress: false,
            log_every: 0,
        }
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::new(100_000)
    }
}
