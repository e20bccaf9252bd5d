//! Action-value table for tabular Q-learning

use std::collections::{HashMap, hash_map::Entry};

use crate::{Error, Result, tictactoe::BOARD_CELLS};

/// Learned values for the nine actions of one state, indexed by
/// `y * 3 + x`
pub type ActionValues = [f64; BOARD_CELLS];

/// Q-table mapping encoded board states to per-action values
///
/// Rows are created lazily as all-zero arrays the first time a state is
/// visited and always hold exactly nine values.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: HashMap<String, ActionValues>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount: f64,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new(learning_rate: f64, discount: f64) -> Self {
        Self {
            values: HashMap::new(),
            learning_rate,
            discount,
        }
    }

    /// Build a table from already decoded rows
    pub fn from_entries(
        entries: HashMap<String, ActionValues>,
        learning_rate: f64,
        discount: f64,
    ) -> Self {
        Self {
            values: entries,
            learning_rate,
            discount,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, state: &str) -> bool {
        self.values.contains_key(state)
    }

    /// Row for `state`, if it has been visited
    pub fn row(&self, state: &str) -> Option<&ActionValues> {
        self.values.get(state)
    }

    /// Row for `state`, inserting an all-zero row first if unseen
    pub fn ensure_row(&mut self, state: &str) -> &mut ActionValues {
        match self.values.entry(state.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert([0.0; BOARD_CELLS]),
        }
    }

    /// Replace the row for `state`, returning the previous one
    pub fn insert(&mut self, state: impl Into<String>, row: ActionValues) -> Option<ActionValues> {
        self.values.insert(state.into(), row)
    }

    /// Value of `action` in `state`; unexplored pairs read as 0.0
    pub fn value(&self, state: &str, action: usize) -> f64 {
        self.values
            .get(state)
            .and_then(|row| row.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Legal action with the highest value, first index wins ties.
    /// `None` when `legal_actions` is empty.
    pub fn greedy_action(&self, state: &str, legal_actions: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &action in legal_actions {
            let value = self.value(state, action);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// One-step Q-learning update
    ///
    /// Q(s,a) ← Q(s,a) + α[target − Q(s,a)], with target = r on terminal
    /// transitions and r + γ max_a' Q(s',a') otherwise. Unseen `state` and
    /// `next_state` rows are inserted as zeros first. Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] if `action` is not in `0..9`.
    pub fn update(
        &mut self,
        state: &str,
        action: usize,
        next_state: Option<&str>,
        reward: f64,
        terminal: bool,
    ) -> Result<f64> {
        if action >= BOARD_CELLS {
            return Err(Error::InvalidAction { action });
        }

        let target = match next_state {
            Some(next) if !terminal => {
                let max_next = self
                    .ensure_row(next)
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                reward + self.discount * max_next
            }
            _ => reward,
        };

        let learning_rate = self.learning_rate;
        let slot = &mut self.ensure_row(state)[action];
        let old = *slot;
        *slot = old + learning_rate * (target - old);
        Ok(*slot)
    }

    /// Entries ordered by state key
    pub fn sorted_entries(&self) -> Vec<(&str, &ActionValues)> {
        let mut entries: Vec<(&str, &ActionValues)> = self
            .values
            .iter()
            .map(|(state, row)| (state.as_str(), row))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Swap in a whole new set of rows
    pub fn replace_entries(&mut self, entries: HashMap<String, ActionValues>) {
        self.values = entries;
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
