//! Analysis tools for learned policies
//!
//! The comparator audits a Q-table against the exact solver and reports how
//! often, and by how much, the table's greedy play departs from optimal play.

pub mod comparator;

pub use comparator::{AnalysisReport, StateVerdict, analyze, judge_state};
