//! Game state port - what the exact solver needs from a game
//!
//! The solver mutates the state in place: every `apply` during search is
//! paired with an `undo` of the same move before the next sibling is tried.

use std::fmt::Debug;

use crate::tictactoe::{Board, Move, Player};

/// Two-player, zero-sum, perfect-information game state
///
/// # Examples
///
/// ```
/// use noughts::{ports::GameState, tictactoe::{Board, Player}};
///
/// let mut board = Board::new();
/// let first = board.moves()[0];
/// assert!(board.apply(first, Player::X));
/// board.undo(first);
/// assert_eq!(board, Board::new());
/// ```
pub trait GameState {
    type Move: Copy + PartialEq + Debug;

    /// Legal moves in a fixed enumeration order
    fn moves(&self) -> Vec<Self::Move>;

    /// Apply `mv` for `player`; returns `false` if the move was rejected
    fn apply(&mut self, mv: Self::Move, player: Player) -> bool;

    /// Revert a previously applied move
    fn undo(&mut self, mv: Self::Move);

    /// Whether the game has ended (win or draw)
    fn is_terminal(&self) -> bool;

    /// Winner of a terminal state; `None` for draws and unfinished games
    fn winner(&self) -> Option<Player>;

    /// Stable key identifying the position, used for memoising scores.
    /// States without a key are never cached.
    fn cache_key(&self) -> Option<String> {
        None
    }
}

impl GameState for Board {
    type Move = Move;

    fn moves(&self) -> Vec<Move> {
        self.legal_moves()
    }

    fn apply(&mut self, mv: Move, player: Player) -> bool {
        self.make_move(mv.x, mv.y, player)
    }

    fn undo(&mut self, mv: Move) {
        self.undo_move(mv.x, mv.y);
    }

    fn is_terminal(&self) -> bool {
        self.is_game_over()
    }

    fn winner(&self) -> Option<Player> {
        self.check_win()
    }

    fn cache_key(&self) -> Option<String> {
        Some(self.encode())
    }
}
