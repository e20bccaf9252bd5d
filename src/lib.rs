//! noughts: tabular Q-learning and exact minimax for Tic-Tac-Toe
//!
//! This crate provides:
//! - Tic-Tac-Toe board with a canonical 9-digit encoding
//! - Exact minimax solver with cached position values and tie-breaking
//! - Tabular Q-learning agent with a binary policy snapshot format
//! - Scripted, flawed, random and human opponents
//! - Training and match pipelines with progress observers
//! - Policy comparator that audits a learned table against exact play

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod opponents;
pub mod ports;
pub mod q_learning;
pub mod solver;
pub mod tictactoe;
pub mod training;

pub use error::{Error, Result};
