//! Move source port - anything that can choose a move for a seat
//!
//! Training loops and matches drive every participant through this trait,
//! so exact, random, flawed and learned players are interchangeable.

use crate::tictactoe::{Board, Move, Player};

/// A participant that picks moves
///
/// # Examples
///
/// ```
/// use noughts::{
///     ports::MoveSource,
///     tictactoe::{Board, Move, Player},
/// };
///
/// struct FirstFree;
///
/// impl MoveSource for FirstFree {
///     fn next_move(&mut self, board: &Board, _player: Player) -> Option<Move> {
///         board.legal_moves().first().copied()
///     }
///
///     fn name(&self) -> &str {
///         "first-free"
///     }
/// }
///
/// let mut source = FirstFree;
/// assert_eq!(source.next_move(&Board::new(), Player::X), Some(Move::new(0, 0)));
/// ```
pub trait MoveSource: Send {
    /// Choose a move for `player`. `None` means the turn cannot be taken.
    fn next_move(&mut self, board: &Board, player: Player) -> Option<Move>;

    /// Name used in logs and reports
    fn name(&self) -> &str;

    /// Reseed the internal random number generator, if there is one.
    ///
    /// # Default Implementation
    ///
    /// Does nothing, for deterministic sources.
    fn set_rng_seed(&mut self, _seed: u64) {}
}
