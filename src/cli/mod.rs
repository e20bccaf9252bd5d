//! CLI infrastructure for the noughts toolkit
//!
//! This module provides the command-line interface for training Q-learning
//! agents, pitting players against each other, and checking learned
//! policies against exact minimax play.

pub mod commands;
pub mod config;
pub mod output;
