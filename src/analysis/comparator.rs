//! Learned-policy versus exact-play comparison
//!
//! For every decision state stored in a Q-table, the table's greedy move is
//! checked for membership in the solver's equivalence class of optimal moves.
//! Disagreements are priced as the guaranteed payoff the table's move gives
//! up relative to an optimal one.

use std::{fs::File, io::BufWriter, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::QTable,
    solver::Minimax,
    tictactoe::{Board, Move, Player},
};

/// Verdict for one table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVerdict {
    /// Board encoding, as stored in the table
    pub state: String,
    pub mover: Player,
    /// Greedy legal move from the table, first index on ties
    pub table_move: Move,
    /// Every move achieving the best guaranteed payoff
    pub optimal_moves: Vec<Move>,
    pub matched: bool,
    /// Guaranteed payoff of the table's move minus that of the first optimal
    /// move; 0 for matches, never positive
    pub delta: f64,
}

/// Aggregate agreement between a table and exact play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Entries in the table
    pub loaded: usize,
    /// Entries compared (decision states only)
    pub total: usize,
    pub matches: usize,
    pub mismatches: usize,
    /// Terminal, unreachable or undecodable entries
    pub skipped: usize,
    /// Mean delta over mismatches
    pub avg_signed_delta: f64,
    /// Mean absolute delta over mismatches
    pub avg_abs_delta: f64,
    /// Per-state breakdown, ordered by state encoding
    pub verdicts: Vec<StateVerdict>,
}

impl AnalysisReport {
    /// Fraction of compared states where the table plays optimally
    pub fn match_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matches as f64 / self.total as f64
        }
    }

    pub fn mismatched(&self) -> impl Iterator<Item = &StateVerdict> {
        self.verdicts.iter().filter(|verdict| !verdict.matched)
    }

    /// Write the report, verdicts included, as pretty JSON
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io("create", path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Write one CSV row per verdict
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for verdict in &self.verdicts {
            writer.serialize(VerdictRecord::from(verdict))?;
        }
        writer
            .flush()
            .map_err(|e| Error::io("write", path.as_ref(), e))?;
        Ok(())
    }
}

/// Flat CSV form of a [`StateVerdict`]
#[derive(Debug, Serialize)]
struct VerdictRecord<'a> {
    state: &'a str,
    mover: Player,
    table_x: usize,
    table_y: usize,
    optimal_moves: String,
    matched: bool,
    delta: f64,
}

impl<'a> From<&'a StateVerdict> for VerdictRecord<'a> {
    fn from(verdict: &'a StateVerdict) -> Self {
        let optimal_moves = verdict
            .optimal_moves
            .iter()
            .map(Move::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            state: &verdict.state,
            mover: verdict.mover,
            table_x: verdict.table_move.x,
            table_y: verdict.table_move.y,
            optimal_moves,
            matched: verdict.matched,
            delta: verdict.delta,
        }
    }
}

/// Judge a single table row. `None` when the entry is not a decision state.
pub fn judge_state(state: &str, table: &QTable, solver: &mut Minimax) -> Option<StateVerdict> {
    let mut board = match Board::decode(state) {
        Ok(board) => board,
        Err(e) => {
            log::debug!("skipping '{state}': {e}");
            return None;
        }
    };
    if board.is_game_over() || !board.is_reachable() {
        log::debug!("skipping '{state}': terminal or unreachable");
        return None;
    }
    let mover = board.next_player().ok()?;

    let table_move = table
        .greedy_action(state, &board.legal_actions())
        .and_then(Move::from_action)?;
    let optimal_moves = solver.optimal_moves(&mut board, mover);
    let matched = optimal_moves.contains(&table_move);

    let delta = match optimal_moves.first() {
        Some(&best) if !matched => {
            let taken = solver.move_payoff(&mut board, mover, table_move)?;
            let optimal = solver.move_payoff(&mut board, mover, best)?;
            taken - optimal
        }
        _ => 0.0,
    };

    Some(StateVerdict {
        state: state.to_owned(),
        mover,
        table_move,
        optimal_moves,
        matched,
        delta,
    })
}

/// Compare every entry of `table` against exact play.
///
/// Entries are visited in key order and every choice is first-found, so the
/// report depends only on the table, not on the solver's tie-break setting.
///
/// # Examples
///
/// ```
/// use noughts::{analysis::analyze, q_learning::QTable, solver::Minimax};
///
/// let mut table = QTable::new(0.1, 1.0);
/// // X has taken the centre; the table answers with an edge
/// table.insert("000010000", [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
///
/// let report = analyze(&table, &mut Minimax::deterministic());
/// assert_eq!(report.mismatches, 1);
/// assert_eq!(report.avg_signed_delta, -0.5);
/// ```
pub fn analyze(table: &QTable, solver: &mut Minimax) -> AnalysisReport {
    let mut verdicts = Vec::new();
    let mut skipped = 0;
    let (mut signed_sum, mut abs_sum) = (0.0, 0.0);

    for (state, _) in table.sorted_entries() {
        match judge_state(state, table, solver) {
            Some(verdict) => {
                if !verdict.matched {
                    signed_sum += verdict.delta;
                    abs_sum += verdict.delta.abs();
                }
                verdicts.push(verdict);
            }
            None => skipped += 1,
        }
    }

    let total = verdicts.len();
    let matches = verdicts.iter().filter(|verdict| verdict.matched).count();
    let mismatches = total - matches;
    let average = |sum: f64| {
        if mismatches == 0 {
            0.0
        } else {
            sum / mismatches as f64
        }
    };

    let report = AnalysisReport {
        loaded: table.len(),
        total,
        matches,
        mismatches,
        skipped,
        avg_signed_delta: average(signed_sum),
        avg_abs_delta: average(abs_sum),
        verdicts,
    };
    log::info!(
        "compared {} of {} states: {} match, {} mismatch ({:.2}% optimal)",
        report.total,
        report.loaded,
        report.matches,
        report.mismatches,
        report.match_rate() * 100.0
    );
    report
}
