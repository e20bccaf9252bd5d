//! ε-greedy Q-learning agent

use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Result,
    config::{Hyperparameters, check_unit_interval},
    q_learning::{
        q_table::QTable,
        serialization::{load_snapshot, save_snapshot},
    },
    tictactoe::Board,
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent (off-policy TD control)
///
/// Owns one Q-table and an exploration rate. Each call to
/// [`QLearningAgent::update_q`] updates a single state-action pair for the
/// acting side only; opponent replies are environment transitions.
///
/// # Examples
///
/// ```
/// use noughts::{config::Hyperparameters, q_learning::QLearningAgent, tictactoe::Board};
///
/// let mut agent = QLearningAgent::new(Hyperparameters::default())?.with_seed(42);
/// let board = Board::new();
/// let action = agent.choose_action(&board).expect("empty board has moves");
/// agent.update_q(&board.encode(), action, None, 1.0, true)?;
/// assert!(agent.table().value(&board.encode(), action) > 0.0);
/// # Ok::<(), noughts::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    epsilon: f64,
    rng: StdRng,
}

impl QLearningAgent {
    /// Create an agent with an empty table.
    ///
    /// # Errors
    ///
    /// Returns error if any hyperparameter is out of range.
    pub fn new(params: Hyperparameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            q_table: QTable::new(params.learning_rate, params.discount),
            epsilon: params.epsilon,
            rng: build_rng(None),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters::new(
            self.q_table.learning_rate(),
            self.q_table.discount(),
            self.epsilon,
        )
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Change the exploration rate, e.g. to 0 for pure exploitation.
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        check_unit_interval("epsilon", epsilon)?;
        self.epsilon = epsilon;
        Ok(())
    }

    pub fn table(&self) -> &QTable {
        &self.q_table
    }

    pub fn table_mut(&mut self) -> &mut QTable {
        &mut self.q_table
    }

    pub fn into_table(self) -> QTable {
        self.q_table
    }

    /// Table key for `board`
    pub fn encode_board(board: &Board) -> String {
        board.encode()
    }

    /// ε-greedy action for `board`, or `None` when no cell is free.
    ///
    /// The board's row is created on first visit even when no action is
    /// available.
    pub fn choose_action(&mut self, board: &Board) -> Option<usize> {
        let state = Self::encode_board(board);
        self.q_table.ensure_row(&state);

        let legal = board.legal_actions();
        if legal.is_empty() {
            return None;
        }

        if self.rng.random::<f64>() < self.epsilon {
            legal.choose(&mut self.rng).copied()
        } else {
            self.q_table.greedy_action(&state, &legal)
        }
    }

    /// One-step bootstrapped update of `(state, action)`.
    ///
    /// `next_state` is ignored when `terminal` is set.
    pub fn update_q(
        &mut self,
        state: &str,
        action: usize,
        next_state: Option<&str>,
        reward: f64,
        terminal: bool,
    ) -> Result<()> {
        self.q_table
            .update(state, action, next_state, reward, terminal)
            .map(|_| ())
    }

    /// Write the table to `path` as a policy snapshot
    pub fn save_policy(&self, path: impl AsRef<Path>) -> Result<()> {
        save_snapshot(path, &self.q_table)
    }

    /// Replace the table with the snapshot at `path`, returning the entry
    /// count. On failure the current table is kept as it was.
    pub fn load_policy(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let entries = load_snapshot(path)?;
        let count = entries.len();
        self.q_table.replace_entries(entries);
        Ok(count)
    }
}
