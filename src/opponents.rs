//! Move sources used as training opponents and match participants
//!
//! Every participant implements [`MoveSource`], so training loops and
//! matches never care whether moves come from the exact solver, a random
//! player, a deliberately flawed heuristic, a frozen policy or a person.

use std::io::{BufRead, Write};

use clap::ValueEnum;
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    ports::MoveSource,
    q_learning::QTable,
    solver::{Minimax, TieBreak},
    tictactoe::{Board, Cell, Move, Player},
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

fn random_move(board: &Board, rng: &mut StdRng) -> Option<Move> {
    board.legal_moves().choose(rng).copied()
}

/// Uniformly random legal moves
#[derive(Debug, Clone)]
pub struct RandomOpponent {
    rng: StdRng,
}

impl RandomOpponent {
    pub fn new() -> Self {
        Self {
            rng: build_rng(None),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Default for RandomOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSource for RandomOpponent {
    fn next_move(&mut self, board: &Board, _player: Player) -> Option<Move> {
        random_move(board, &mut self.rng)
    }

    fn name(&self) -> &str {
        "random"
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Perfect play from the exact solver
#[derive(Debug, Clone, Default)]
pub struct MinimaxOpponent {
    solver: Minimax,
}

impl MinimaxOpponent {
    /// Randomised tie-break among optimal moves
    pub fn new() -> Self {
        Self {
            solver: Minimax::new(),
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.solver.set_tie_break(tie_break);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.solver.reseed(seed);
        self
    }
}

impl MoveSource for MinimaxOpponent {
    fn next_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        let mut scratch = *board;
        self.solver.best_move(&mut scratch, player)
    }

    fn name(&self) -> &str {
        "minimax"
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.solver.reseed(seed);
    }
}

/// Blind spot of a [`FlawedOpponent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Flaw {
    /// Misses the threat on the right-hand column: when the opponent holds
    /// (2,0) and (2,2) with (2,1) open, plays (0,0), else (1,1), else any
    /// random move.
    ColumnLeak,
    /// Gives up on the top row: when the opponent holds (0,2) and (2,2) with
    /// (1,2) open and the mover owns the centre, plays a random move.
    TopRowLeak,
}

impl Flaw {
    fn triggered(self, board: &Board, player: Player) -> bool {
        let theirs = player.opponent().to_cell();
        match self {
            Flaw::ColumnLeak => {
                board.get(2, 0) == theirs
                    && board.get(2, 2) == theirs
                    && board.get(2, 1) == Cell::Empty
            }
            Flaw::TopRowLeak => {
                board.get(0, 2) == theirs
                    && board.get(2, 2) == theirs
                    && board.get(1, 2) == Cell::Empty
                    && board.get(1, 1) == player.to_cell()
            }
        }
    }
}

/// Exact play with one pattern-triggered blind spot
///
/// # Examples
///
/// ```
/// use noughts::{
///     opponents::{Flaw, FlawedOpponent},
///     ports::MoveSource,
///     tictactoe::{Board, Move, Player},
/// };
///
/// // X threatens the right-hand column; O should block at (2,1)
/// let board = Board::decode("001020001")?;
/// let mut leaky = FlawedOpponent::new(Flaw::ColumnLeak).with_seed(1);
/// assert_eq!(leaky.next_move(&board, Player::O), Some(Move::new(0, 0)));
/// # Ok::<(), noughts::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FlawedOpponent {
    flaw: Flaw,
    solver: Minimax,
    rng: StdRng,
}

impl FlawedOpponent {
    pub fn new(flaw: Flaw) -> Self {
        Self {
            flaw,
            solver: Minimax::new(),
            rng: build_rng(None),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_rng_seed(seed);
        self
    }

    pub fn flaw(&self) -> Flaw {
        self.flaw
    }
}

impl MoveSource for FlawedOpponent {
    fn next_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        if self.flaw.triggered(board, player) {
            log::trace!("{:?} triggered for {player}", self.flaw);
            return match self.flaw {
                Flaw::ColumnLeak => [Move::new(0, 0), Move::new(1, 1)]
                    .into_iter()
                    .find(|mv| board.is_valid_move(mv.x, mv.y))
                    .or_else(|| random_move(board, &mut self.rng)),
                Flaw::TopRowLeak => random_move(board, &mut self.rng),
            };
        }
        let mut scratch = *board;
        self.solver.best_move(&mut scratch, player)
    }

    fn name(&self) -> &str {
        match self.flaw {
            Flaw::ColumnLeak => "buggy",
            Flaw::TopRowLeak => "buggy2",
        }
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.solver.reseed(seed.wrapping_add(1));
    }
}

/// A frozen Q-table played greedily
#[derive(Debug, Clone)]
pub struct PolicyOpponent {
    table: QTable,
    name: String,
}

impl PolicyOpponent {
    pub fn new(table: QTable, name: impl Into<String>) -> Self {
        Self {
            table,
            name: name.into(),
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }
}

impl MoveSource for PolicyOpponent {
    fn next_move(&mut self, board: &Board, _player: Player) -> Option<Move> {
        self.table
            .greedy_action(&board.encode(), &board.legal_actions())
            .and_then(Move::from_action)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A person entering "x y" coordinates
///
/// Malformed, out-of-range and occupied coordinates are reported and the
/// prompt repeats. End of input gives up the turn.
pub struct HumanOpponent<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead + Send, W: Write + Send> HumanOpponent<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, board: &Board, player: Player) -> std::io::Result<Option<Move>> {
        writeln!(self.output, "\n{board}")?;
        loop {
            write!(self.output, "{player} to move, enter x y (0-2): ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            match parse_coordinates(&line) {
                Some(mv) if board.is_valid_move(mv.x, mv.y) => return Ok(Some(mv)),
                Some(mv) => writeln!(self.output, "Cell {mv} is off the board or taken.")?,
                None => writeln!(self.output, "Expected two numbers, e.g. \"1 1\".")?,
            }
        }
    }
}

fn parse_coordinates(line: &str) -> Option<Move> {
    let mut parts = line.split_whitespace().map(str::parse::<usize>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(x)), Some(Ok(y)), None) => Some(Move::new(x, y)),
        _ => None,
    }
}

impl<R: BufRead + Send, W: Write + Send> MoveSource for HumanOpponent<R, W> {
    fn next_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        match self.prompt(board, player) {
            Ok(mv) => mv,
            Err(e) => {
                log::warn!("failed to read move: {e}");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "human"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_random_opponent_legal_and_reproducible() {
        let board = Board::decode("120012000").unwrap();
        let mut a = RandomOpponent::new().with_seed(11);
        let mut b = RandomOpponent::new().with_seed(11);
        for _ in 0..20 {
            let mv = a.next_move(&board, Player::X).unwrap();
            assert!(board.is_valid_move(mv.x, mv.y));
            assert_eq!(Some(mv), b.next_move(&board, Player::X));
        }
        let full = Board::decode("121122211").unwrap();
        assert_eq!(a.next_move(&full, Player::X), None);
    }

    #[test]
    fn test_minimax_opponent_blocks() {
        let board = Board::decode("110020000").unwrap();
        let mut opponent = MinimaxOpponent::new().with_seed(2);
        assert_eq!(
            opponent.next_move(&board, Player::O),
            Some(Move::new(2, 2))
        );
    }

    #[test]
    fn test_column_leak_skips_the_block() {
        // . . X
        // . O .
        // . . X
        let board = Board::decode("001020001").unwrap();
        let mut leaky = FlawedOpponent::new(Flaw::ColumnLeak).with_seed(3);
        assert_eq!(leaky.next_move(&board, Player::O), Some(Move::new(0, 0)));

        let mut exact = MinimaxOpponent::new().with_seed(3);
        assert_eq!(exact.next_move(&board, Player::O), Some(Move::new(2, 1)));
    }

    #[test]
    fn test_column_leak_falls_back_to_centre() {
        // . . X
        // . . .
        // O . X
        let board = Board::decode("001000201").unwrap();
        let mut leaky = FlawedOpponent::new(Flaw::ColumnLeak).with_seed(3);
        assert_eq!(leaky.next_move(&board, Player::O), Some(Move::new(1, 1)));
    }

    #[test]
    fn test_top_row_leak_plays_random() {
        // X . X
        // . O .
        // . . .
        let board = Board::decode("101020000").unwrap();
        assert!(Flaw::TopRowLeak.triggered(&board, Player::O));
        let mut leaky = FlawedOpponent::new(Flaw::TopRowLeak).with_seed(4);
        let mv = leaky.next_move(&board, Player::O).unwrap();
        assert!(board.is_valid_move(mv.x, mv.y));
    }

    #[test]
    fn test_flaws_inactive_elsewhere() {
        let board = Board::decode("110020000").unwrap();
        assert!(!Flaw::ColumnLeak.triggered(&board, Player::O));
        assert!(!Flaw::TopRowLeak.triggered(&board, Player::O));
        let mut leaky = FlawedOpponent::new(Flaw::TopRowLeak).with_seed(5);
        assert_eq!(leaky.next_move(&board, Player::O), Some(Move::new(2, 2)));
    }

    #[test]
    fn test_policy_opponent_plays_greedy() {
        let mut table = QTable::new(0.1, 1.0);
        table.insert("000000000", [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let mut policy = PolicyOpponent::new(table, "policy.bin");
        assert_eq!(
            policy.next_move(&Board::new(), Player::X),
            Some(Move::new(1, 1))
        );
        assert_eq!(policy.name(), "policy.bin");
    }

    #[test]
    fn test_human_reprompts_until_valid() {
        let mut board = Board::new();
        board.make_move(1, 1, Player::X);
        let input = Cursor::new("hello\n1 1\n5 0\n0 2\n");
        let mut output = Vec::new();
        let mut human = HumanOpponent::new(input, &mut output);
        assert_eq!(human.next_move(&board, Player::O), Some(Move::new(0, 2)));

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("Expected two numbers"));
        assert_eq!(transcript.matches("off the board or taken").count(), 2);
    }

    #[test]
    fn test_human_end_of_input() {
        let mut human = HumanOpponent::new(Cursor::new(""), Vec::new());
        assert_eq!(human.next_move(&Board::new(), Player::X), None);
    }
}
