//! Exhaustive checks of the exact solver over every reachable position

use std::collections::HashSet;

use noughts::{
    ports::GameState,
    solver::{Minimax, TieBreak},
    tictactoe::{Board, Move, Player},
};

fn reachable_positions() -> Vec<Board> {
    fn visit(board: &mut Board, mover: Player, seen: &mut HashSet<String>, out: &mut Vec<Board>) {
        if !seen.insert(board.encode()) {
            return;
        }
        out.push(*board);
        if board.is_game_over() {
            return;
        }
        for mv in board.legal_moves() {
            board.make_move(mv.x, mv.y, mover);
            visit(board, mover.opponent(), seen, out);
            board.undo_move(mv.x, mv.y);
        }
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    visit(&mut Board::new(), Player::X, &mut seen, &mut out);
    out
}

#[test]
fn test_reachable_position_count() {
    let positions = reachable_positions();
    assert_eq!(positions.len(), 5478);
    assert!(positions.iter().all(Board::is_reachable));
}

#[test]
fn test_scores_are_consistent_everywhere() {
    let mut solver = Minimax::deterministic();

    for mut board in reachable_positions() {
        if board.is_game_over() {
            continue;
        }
        let mover = board.next_player().unwrap();
        let before = board;

        let score = solver.score_position(&mut board, mover);
        assert!([0.0, 0.5, 1.0].contains(&score), "{} scored {score}", board.encode());

        let payoffs = solver.move_payoffs(&mut board, mover);
        let best = payoffs.iter().map(|&(_, p)| p).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(best, score, "best reply disagrees at {}", board.encode());

        let optimal = solver.optimal_moves(&mut board, mover);
        assert!(!optimal.is_empty());
        for mv in &optimal {
            assert_eq!(solver.move_payoff(&mut board, mover, *mv), Some(score));
        }
        // Optimal moves keep enumeration order
        let order: Vec<Move> = payoffs
            .iter()
            .filter(|&&(_, p)| p == score)
            .map(|&(mv, _)| mv)
            .collect();
        assert_eq!(optimal, order);

        assert_eq!(board, before, "search must restore the board");
    }
}

#[test]
fn test_cached_and_uncached_agree() {
    let mut cached = Minimax::deterministic();
    let mut uncached = Minimax::deterministic().without_cache();

    for mut board in reachable_positions().into_iter().step_by(37) {
        if board.is_game_over() {
            continue;
        }
        let mover = board.next_player().unwrap();
        assert_eq!(
            cached.score_position(&mut board, mover),
            uncached.score_position(&mut board, mover)
        );
        assert_eq!(
            cached.optimal_moves(&mut board, mover),
            uncached.optimal_moves(&mut board, mover)
        );
    }
}

#[test]
fn test_random_tie_break_stays_in_class() {
    let mut solver = Minimax::new().with_seed(99);
    let mut board = Board::new();
    let optimal = solver.optimal_moves(&mut board, Player::X);
    assert_eq!(optimal.len(), 9);

    let mut picked = HashSet::new();
    for _ in 0..200 {
        let mv = solver.best_move(&mut board, Player::X).unwrap();
        assert!(optimal.contains(&mv));
        picked.insert(mv);
    }
    assert!(picked.len() > 1, "random tie-break should vary");

    let first = solver.best_move_with(&mut board, Player::X, TieBreak::First);
    assert_eq!(first, optimal.first().copied());
}

/// Single pile, take one or two, taking the last stone wins
struct Pile {
    stones: u8,
    history: Vec<Player>,
}

impl GameState for Pile {
    type Move = u8;

    fn moves(&self) -> Vec<u8> {
        (1..=2).filter(|&n| n <= self.stones).collect()
    }

    fn apply(&mut self, mv: u8, player: Player) -> bool {
        if mv == 0 || mv > self.stones {
            return false;
        }
        self.stones -= mv;
        self.history.push(player);
        true
    }

    fn undo(&mut self, mv: u8) {
        self.stones += mv;
        self.history.pop();
    }

    fn is_terminal(&self) -> bool {
        self.stones == 0
    }

    fn winner(&self) -> Option<Player> {
        if self.stones == 0 {
            self.history.last().copied()
        } else {
            None
        }
    }
}

#[test]
fn test_solver_is_generic_over_game_state() {
    let mut solver = Minimax::deterministic();

    let mut losing = Pile { stones: 3, history: Vec::new() };
    assert_eq!(solver.score_position(&mut losing, Player::X), 0.0);

    let mut winning = Pile { stones: 4, history: Vec::new() };
    assert_eq!(solver.score_position(&mut winning, Player::X), 1.0);
    assert_eq!(solver.optimal_moves(&mut winning, Player::X), vec![1]);
    assert_eq!(winning.stones, 4);
}
