//! Training and match pipelines
//!
//! This module provides:
//! - Q-learning against any [`MoveSource`](crate::ports::MoveSource) opponent
//! - Self-play between two learning agents
//! - Head-to-head matches between any two move sources
//! - Observers for progress bars and periodic log lines

pub mod observers;
pub mod pipeline;

pub use observers::{LogObserver, ProgressObserver};
pub use pipeline::{MatchReport, TrainingPipeline, TrainingReport};
