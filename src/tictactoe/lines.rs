//! Winning line analysis for Tic-Tac-Toe

use super::{Cell, Player};

/// Winning lines as action indices (`y * 3 + x`)
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Utility for analyzing winning lines in Tic-Tac-Toe
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Check if a player has three in a row
    pub fn has_won(cells: &[Cell; 9], player: Player) -> bool {
        let target = player.to_cell();
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// Winner of the position, scanning rows, then columns, then diagonals
    pub fn winner(cells: &[Cell; 9]) -> Option<Player> {
        WINNING_LINES.iter().find_map(|line| {
            let first = cells[line[0]];
            if first != Cell::Empty && line.iter().all(|&idx| cells[idx] == first) {
                first.to_player()
            } else {
                None
            }
        })
    }
}
