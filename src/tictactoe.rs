//! Tic-Tac-Toe game state

pub mod board;
pub mod lines;

pub use board::{BOARD_CELLS, Board, Cell, GameOutcome, Move, PieceCount, Player};
pub use lines::{LineAnalyzer, WINNING_LINES};
