//! Recursive payoff evaluation and optimal move extraction

use std::collections::HashMap;

use clap::ValueEnum;
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{ports::GameState, tictactoe::Player};

/// Two payoffs closer than this are the same payoff
pub const TIE_TOLERANCE: f64 = 1e-9;

/// How [`Minimax::best_move`] picks from a set of equally good moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First optimal move in enumeration order
    First,
    /// Uniformly random optimal move
    #[default]
    Random,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Exact solver for two-player zero-sum games
///
/// Scores are memoised per `(position, mover)` when the state provides a
/// cache key; the cache never changes any returned value.
///
/// # Examples
///
/// ```
/// use noughts::{solver::Minimax, tictactoe::{Board, Player}};
///
/// let mut solver = Minimax::deterministic();
/// let mut board = Board::new();
/// assert_eq!(solver.score_position(&mut board, Player::X), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Minimax {
    tie_break: TieBreak,
    rng: StdRng,
    cache: Option<HashMap<(String, Player), f64>>,
}

impl Minimax {
    /// Solver that randomises among equally good moves
    pub fn new() -> Self {
        Self {
            tie_break: TieBreak::Random,
            rng: build_rng(None),
            cache: Some(HashMap::new()),
        }
    }

    /// Solver that always returns the first optimal move
    pub fn deterministic() -> Self {
        Self::new().with_tie_break(TieBreak::First)
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Disable score memoisation
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn set_tie_break(&mut self, tie_break: TieBreak) {
        self.tie_break = tie_break;
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Guaranteed payoff for `mover`, who is about to act, under optimal play
    /// by both sides.
    ///
    /// The state is mutated during the search and restored before returning.
    pub fn score_position<S: GameState>(&mut self, state: &mut S, mover: Player) -> f64 {
        if state.is_terminal() {
            return match state.winner() {
                Some(winner) if winner == mover => 1.0,
                Some(_) => 0.0,
                None => 0.5,
            };
        }

        let key = match self.cache {
            Some(_) => state.cache_key().map(|key| (key, mover)),
            None => None,
        };
        if let Some(key) = &key
            && let Some(&value) = self.cache.as_ref().and_then(|cache| cache.get(key))
        {
            return value;
        }

        let opponent = mover.opponent();
        let mut best_other = f64::INFINITY;
        for mv in state.moves() {
            if !state.apply(mv, mover) {
                continue;
            }
            let other = self.score_position(state, opponent);
            state.undo(mv);
            best_other = best_other.min(other);
        }

        // A non-terminal state with no moves cannot occur in Tic-Tac-Toe
        let value = if best_other.is_finite() {
            1.0 - best_other
        } else {
            0.5
        };

        if let (Some(key), Some(cache)) = (key, self.cache.as_mut()) {
            cache.insert(key, value);
        }
        value
    }

    /// Payoff `mover` is guaranteed after committing to `mv`.
    ///
    /// Returns `None` if the state rejects the move.
    pub fn move_payoff<S: GameState>(
        &mut self,
        state: &mut S,
        mover: Player,
        mv: S::Move,
    ) -> Option<f64> {
        if !state.apply(mv, mover) {
            return None;
        }
        let other = self.score_position(state, mover.opponent());
        state.undo(mv);
        Some(1.0 - other)
    }

    /// Every legal move paired with its payoff for `mover`, in enumeration order
    pub fn move_payoffs<S: GameState>(&mut self, state: &mut S, mover: Player) -> Vec<(S::Move, f64)> {
        state
            .moves()
            .into_iter()
            .filter_map(|mv| self.move_payoff(state, mover, mv).map(|payoff| (mv, payoff)))
            .collect()
    }

    /// The equivalence class of moves achieving the best guaranteed payoff,
    /// in enumeration order. Empty when no move is available.
    pub fn optimal_moves<S: GameState>(&mut self, state: &mut S, mover: Player) -> Vec<S::Move> {
        let payoffs = self.move_payoffs(state, mover);
        let best = payoffs
            .iter()
            .map(|&(_, payoff)| payoff)
            .fold(f64::NEG_INFINITY, f64::max);

        let optimal: Vec<S::Move> = payoffs
            .into_iter()
            .filter(|&(_, payoff)| (best - payoff).abs() < TIE_TOLERANCE)
            .map(|(mv, _)| mv)
            .collect();

        log::trace!(
            "{} equivalent moves found, achieving guaranteed payoff = {}",
            optimal.len(),
            best
        );
        optimal
    }

    /// One optimal move chosen with the solver's tie-break policy, or `None`
    /// if no move is available.
    pub fn best_move<S: GameState>(&mut self, state: &mut S, mover: Player) -> Option<S::Move> {
        self.best_move_with(state, mover, self.tie_break)
    }

    /// Like [`Minimax::best_move`] with an explicit tie-break for this call
    pub fn best_move_with<S: GameState>(
        &mut self,
        state: &mut S,
        mover: Player,
        tie_break: TieBreak,
    ) -> Option<S::Move> {
        let optimal = self.optimal_moves(state, mover);
        match tie_break {
            TieBreak::First => optimal.first().copied(),
            TieBreak::Random => optimal.choose(&mut self.rng).copied(),
        }
    }
}

impl Default for Minimax {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::{Board, Move};

    fn corners() -> Vec<Move> {
        vec![
            Move::new(0, 0),
            Move::new(0, 2),
            Move::new(2, 0),
            Move::new(2, 2),
        ]
    }

    #[test]
    fn test_empty_board_is_a_draw() {
        let mut solver = Minimax::deterministic();
        let mut board = Board::new();
        assert_eq!(solver.score_position(&mut board, Player::X), 0.5);
        assert_eq!(board, Board::new(), "search must restore the board");
    }

    #[test]
    fn test_every_opening_move_draws() {
        let mut solver = Minimax::deterministic();
        let mut board = Board::new();
        assert_eq!(solver.optimal_moves(&mut board, Player::X).len(), 9);
    }

    #[test]
    fn test_terminal_scores() {
        let mut solver = Minimax::deterministic();
        // X X X
        // O O .
        // . . .
        let mut board = Board::decode("111220000").unwrap();
        assert_eq!(solver.score_position(&mut board, Player::X), 1.0);
        assert_eq!(solver.score_position(&mut board, Player::O), 0.0);

        let mut draw = Board::decode("121122211").unwrap();
        assert_eq!(solver.score_position(&mut draw, Player::X), 0.5);
        assert_eq!(solver.score_position(&mut draw, Player::O), 0.5);
    }

    #[test]
    fn test_centre_opening_only_corners_hold() {
        let mut solver = Minimax::deterministic();
        let mut board = Board::new();
        board.make_move(1, 1, Player::X);

        let optimal = solver.optimal_moves(&mut board, Player::O);
        assert_eq!(optimal, corners());
        assert_eq!(solver.score_position(&mut board, Player::O), 0.5);
    }

    #[test]
    fn test_forced_block() {
        let mut solver = Minimax::deterministic();
        // X X .
        // . O .
        // . . .
        let mut board = Board::decode("110020000").unwrap();
        let optimal = solver.optimal_moves(&mut board, Player::O);
        assert_eq!(optimal, vec![Move::new(2, 2)]);
        assert_eq!(solver.score_position(&mut board, Player::O), 0.5);
    }

    #[test]
    fn test_immediate_win_is_optimal() {
        let mut solver = Minimax::deterministic();
        // X X .
        // . . .
        // O O .
        let mut board = Board::decode("110000220").unwrap();
        let optimal = solver.optimal_moves(&mut board, Player::X);
        assert!(optimal.contains(&Move::new(2, 2)));
        for mv in optimal {
            assert_eq!(solver.move_payoff(&mut board, Player::X, mv), Some(1.0));
        }
        assert_eq!(solver.score_position(&mut board, Player::X), 1.0);
    }

    #[test]
    fn test_score_is_best_move_payoff() {
        let mut solver = Minimax::deterministic();
        for encoded in ["000010000", "100000000", "100020001", "010000020"] {
            let mut board = Board::decode(encoded).unwrap();
            let mover = board.next_player().unwrap();
            let best = solver
                .move_payoffs(&mut board, mover)
                .into_iter()
                .map(|(_, payoff)| payoff)
                .fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(solver.score_position(&mut board, mover), best);
        }
    }

    #[test]
    fn test_cache_does_not_change_scores() {
        let mut cached = Minimax::deterministic();
        let mut uncached = Minimax::deterministic().without_cache();
        for encoded in ["000010000", "100000000", "100020001", "112020000"] {
            let mut board = Board::decode(encoded).unwrap();
            for mover in [Player::X, Player::O] {
                assert_eq!(
                    cached.score_position(&mut board, mover),
                    uncached.score_position(&mut board, mover)
                );
            }
        }
    }

    #[test]
    fn test_best_move_first_tie_break() {
        let mut solver = Minimax::deterministic();
        let mut board = Board::new();
        board.make_move(1, 1, Player::X);
        assert_eq!(
            solver.best_move(&mut board, Player::O),
            Some(Move::new(0, 0))
        );
    }

    #[test]
    fn test_random_best_move_stays_in_class() {
        let mut solver = Minimax::new().with_seed(7);
        let mut board = Board::new();
        board.make_move(1, 1, Player::X);
        let optimal = solver.optimal_moves(&mut board, Player::O);
        for _ in 0..20 {
            let mv = solver.best_move(&mut board, Player::O).unwrap();
            assert!(optimal.contains(&mv));
        }
    }

    #[test]
    fn test_per_call_tie_break_override() {
        let mut solver = Minimax::new().with_seed(3);
        let mut board = Board::new();
        board.make_move(1, 1, Player::X);
        assert_eq!(
            solver.best_move_with(&mut board, Player::O, TieBreak::First),
            Some(Move::new(0, 0))
        );
    }

    #[test]
    fn test_no_move_on_full_board() {
        let mut solver = Minimax::new().with_seed(1);
        let mut board = Board::decode("121122211").unwrap();
        assert_eq!(solver.best_move(&mut board, Player::X), None);
        assert!(solver.optimal_moves(&mut board, Player::X).is_empty());
    }
}
