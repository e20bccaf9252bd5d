//! Tabular Q-learning
//!
//! An agent keeps one row of nine action values per encoded board it has
//! visited. Actions are chosen ε-greedily and learned with the one-step
//! bootstrapped update
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') − Q(s,a)]
//! ```
//!
//! where the bootstrap term is dropped on terminal transitions. Tables are
//! persisted as a compact little-endian snapshot (see [`serialization`]).
//!
//! ## Usage Example
//!
//! ```no_run
//! use noughts::{config::Hyperparameters, q_learning::QLearningAgent};
//!
//! let mut agent = QLearningAgent::new(Hyperparameters::default())?.with_seed(7);
//! agent.load_policy("q_policy.bin")?;
//! agent.set_epsilon(0.0)?;
//! # Ok::<(), noughts::Error>(())
//! ```

pub mod agent;
pub mod q_table;
pub mod serialization;

pub use agent::QLearningAgent;
pub use q_table::{ActionValues, QTable};
pub use serialization::{load_snapshot, read_snapshot, save_snapshot, write_snapshot};
