//! Board state representation and basic operations
//!
//! Coordinates follow the `(x, y)` convention with `(0, 0)` in the bottom-left
//! corner. Action indices are row-major from the bottom row: `y * 3 + x`.
//! The canonical text encoding scans rows top-to-bottom (`y = 2` first), one
//! ASCII digit per cell: `'0'` empty, `'1'` X, `'2'` O.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;

/// Number of cells (and actions) on the board
pub const BOARD_CELLS: usize = 9;

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    /// Digit used in the canonical state encoding
    pub fn to_digit(self) -> char {
        match self {
            Cell::Empty => '0',
            Cell::X => '1',
            Cell::O => '2',
        }
    }

    pub fn from_digit(c: char) -> Option<Cell> {
        match c {
            '0' => Some(Cell::Empty),
            '1' => Some(Cell::X),
            '2' => Some(Cell::O),
            _ => None,
        }
    }

    pub fn to_player(self) -> Option<Player> {
        match self {
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
            Cell::Empty => None,
        }
    }
}

/// A player in the game. X always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }

    /// Seat number used in console output (`1` for X, `2` for O)
    pub fn seat(self) -> u8 {
        match self {
            Player::X => 1,
            Player::O => 2,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell().to_char())
    }
}

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

impl GameOutcome {
    /// Terminal reward for `player`: +1 win, -1 loss, 0 draw
    pub fn reward_for(self, player: Player) -> f64 {
        match self {
            GameOutcome::Win(winner) if winner == player => 1.0,
            GameOutcome::Win(_) => -1.0,
            GameOutcome::Draw => 0.0,
        }
    }
}

/// A board coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub x: usize,
    pub y: usize,
}

impl Move {
    pub const fn new(x: usize, y: usize) -> Self {
        Move { x, y }
    }

    /// Move for an action index, `None` when the index is off the board
    pub fn from_action(action: usize) -> Option<Self> {
        (action < BOARD_CELLS).then(|| Move::new(action % 3, action / 3))
    }

    /// Row-major action index (`y * 3 + x`)
    pub fn action(self) -> usize {
        self.y * 3 + self.x
    }

    pub fn in_bounds(self) -> bool {
        self.x < 3 && self.y < 3
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Mutable 3x3 grid. Moves are applied and undone in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

/// Count of each piece type on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceCount {
    pub x: usize,
    pub o: usize,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Board {
            cells: [Cell::Empty; BOARD_CELLS],
        }
    }

    /// Cells indexed by action index
    pub fn cells(&self) -> &[Cell; BOARD_CELLS] {
        &self.cells
    }

    /// Cell at `(x, y)`; out-of-range coordinates read as empty
    pub fn get(&self, x: usize, y: usize) -> Cell {
        if x < 3 && y < 3 {
            self.cells[y * 3 + x]
        } else {
            Cell::Empty
        }
    }

    /// Checks the coordinates are on the board and the cell is free
    pub fn is_valid_move(&self, x: usize, y: usize) -> bool {
        x < 3 && y < 3 && self.cells[y * 3 + x] == Cell::Empty
    }

    /// Place `player` at `(x, y)`. Returns `false` and leaves the board
    /// untouched when the move is invalid.
    pub fn make_move(&mut self, x: usize, y: usize, player: Player) -> bool {
        if !self.is_valid_move(x, y) {
            return false;
        }
        self.cells[y * 3 + x] = player.to_cell();
        true
    }

    /// Clear `(x, y)`. Out-of-range coordinates are ignored.
    pub fn undo_move(&mut self, x: usize, y: usize) {
        if x < 3 && y < 3 {
            self.cells[y * 3 + x] = Cell::Empty;
        }
    }

    /// Winning player, if any
    pub fn check_win(&self) -> Option<Player> {
        LineAnalyzer::winner(&self.cells)
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// A win or a full board ends the game
    pub fn is_game_over(&self) -> bool {
        self.check_win().is_some() || self.is_full()
    }

    /// Outcome once the game is over, `None` while it is still running
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.check_win() {
            Some(winner) => Some(GameOutcome::Win(winner)),
            None if self.is_full() => Some(GameOutcome::Draw),
            None => None,
        }
    }

    /// Free cells in enumeration order: increasing `x`, then increasing `y`
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(BOARD_CELLS);
        for x in 0..3 {
            for y in 0..3 {
                if self.is_valid_move(x, y) {
                    moves.push(Move::new(x, y));
                }
            }
        }
        moves
    }

    /// Free cells as increasing action indices
    pub fn legal_actions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn piece_counts(&self) -> PieceCount {
        let mut count = PieceCount { x: 0, o: 0 };
        for cell in &self.cells {
            match cell {
                Cell::X => count.x += 1,
                Cell::O => count.o += 1,
                Cell::Empty => {}
            }
        }
        count
    }

    /// Player to move, inferred from piece counts (X opens)
    pub fn next_player(&self) -> Result<Player, crate::Error> {
        let count = self.piece_counts();
        if count.x == count.o {
            Ok(Player::X)
        } else if count.x == count.o + 1 {
            Ok(Player::O)
        } else {
            Err(crate::Error::InvalidPieceCounts {
                x_count: count.x,
                o_count: count.o,
            })
        }
    }

    /// Whether the position can arise in an X-first game: counts alternate,
    /// at most one side has a line, and the side with a line moved last.
    pub fn is_reachable(&self) -> bool {
        let count = self.piece_counts();
        let x_ahead = count.x == count.o + 1;
        if count.x != count.o && !x_ahead {
            return false;
        }

        let x_won = LineAnalyzer::has_won(&self.cells, Player::X);
        let o_won = LineAnalyzer::has_won(&self.cells, Player::O);
        match (x_won, o_won) {
            (true, true) => false,
            (true, false) => x_ahead,
            (false, true) => !x_ahead,
            (false, false) => true,
        }
    }

    /// Canonical 9-digit encoding, rows top-to-bottom
    pub fn encode(&self) -> String {
        let mut encoded = String::with_capacity(BOARD_CELLS);
        for y in (0..3).rev() {
            for x in 0..3 {
                encoded.push(self.cells[y * 3 + x].to_digit());
            }
        }
        encoded
    }

    /// Rebuild a board from its canonical encoding by replaying every
    /// occupied cell onto an empty board.
    ///
    /// # Errors
    ///
    /// Returns error if the encoding is not exactly 9 digits in `'0'..='2'`.
    /// Piece counts are not checked here; see [`Board::is_reachable`].
    pub fn decode(encoded: &str) -> Result<Self, crate::Error> {
        let chars: Vec<char> = encoded.chars().collect();
        if chars.len() != BOARD_CELLS {
            return Err(crate::Error::InvalidBoardLength {
                expected: BOARD_CELLS,
                got: chars.len(),
                context: encoded.to_string(),
            });
        }

        let mut board = Board::new();
        for (i, &c) in chars.iter().enumerate() {
            let cell = Cell::from_digit(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i,
                context: encoded.to_string(),
            })?;
            if let Some(player) = cell.to_player() {
                let (x, y) = (i % 3, 2 - i / 3);
                board.make_move(x, y, player);
            }
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..3).rev() {
            let row: Vec<String> = (0..3)
                .map(|x| format!(" {}", self.get(x, y).to_char()))
                .collect();
            writeln!(f, "{}", row.join(" |"))?;
            if y > 0 {
                writeln!(f, "-----------")?;
            }
        }
        Ok(())
    }
}
