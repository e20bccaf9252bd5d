//! Exact game solver
//!
//! Full-depth minimax over the payoff alphabet {0.0, 0.5, 1.0}: a win is
//! worth 1.0, a draw 0.5 and a loss 0.0, and the two sides' guaranteed
//! payoffs in any position sum to 1.0. That complement structure lets the
//! search evaluate every node from the perspective of the side to move.

pub mod minimax;

pub use minimax::{Minimax, TIE_TOLERANCE, TieBreak};
