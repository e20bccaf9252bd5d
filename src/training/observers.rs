//! Observers for training runs and matches
//!
//! Observers collect progress without coupling the game loops to a
//! particular output.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Result,
    ports::Observer,
    tictactoe::{GameOutcome, Player},
};

/// Running tally of results, from X's point of view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
    abandoned: usize,
}

impl Tally {
    fn record(&mut self, outcome: Option<GameOutcome>) {
        match outcome {
            Some(GameOutcome::Win(Player::X)) => self.x_wins += 1,
            Some(GameOutcome::Win(Player::O)) => self.o_wins += 1,
            Some(GameOutcome::Draw) => self.draws += 1,
            None => self.abandoned += 1,
        }
    }

    fn message(&self) -> String {
        format!("X:{} O:{} D:{}", self.x_wins, self.o_wins, self.draws)
    }
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    tally: Tally,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            tally: Tally::default(),
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_start(&mut self, total_games: usize) -> Result<()> {
        let pb = ProgressBar::new(total_games as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, outcome: Option<GameOutcome>) -> Result<()> {
        self.tally.record(outcome);
        if let Some(pb) = &self.progress_bar {
            pb.set_position(game_num as u64 + 1);
            pb.set_message(self.tally.message());
        }
        Ok(())
    }

    fn on_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.tally.message());
        }
        Ok(())
    }
}

/// Log observer - Logs a progress line with timing every `every` games
pub struct LogObserver {
    every: usize,
    total_games: usize,
    started: Option<Instant>,
    tally: Tally,
}

impl LogObserver {
    pub fn new(every: usize) -> Self {
        Self {
            every,
            total_games: 0,
            started: None,
            tally: Tally::default(),
        }
    }
}

impl Observer for LogObserver {
    fn on_start(&mut self, total_games: usize) -> Result<()> {
        self.total_games = total_games;
        self.started = Some(Instant::now());
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, outcome: Option<GameOutcome>) -> Result<()> {
        self.tally.record(outcome);
        let played = game_num + 1;
        if self.every == 0 || !played.is_multiple_of(self.every) {
            return Ok(());
        }

        let elapsed = self
            .started
            .map(|start| start.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let remaining = elapsed / played as f64 * self.total_games.saturating_sub(played) as f64;
        log::info!(
            "episode {played}/{} completed ({}), elapsed {elapsed:.1}s, estimated remaining {:.1}min",
            self.total_games,
            self.tally.message(),
            remaining / 60.0
        );
        Ok(())
    }

    fn on_end(&mut self) -> Result<()> {
        log::info!(
            "finished {} games ({}, abandoned {})",
            self.total_games,
            self.tally.message(),
            self.tally.abandoned
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_every_outcome() {
        let mut tally = Tally::default();
        tally.record(Some(GameOutcome::Win(Player::X)));
        tally.record(Some(GameOutcome::Win(Player::O)));
        tally.record(Some(GameOutcome::Draw));
        tally.record(Some(GameOutcome::Draw));
        tally.record(None);
        assert_eq!(tally.message(), "X:1 O:1 D:2");
        assert_eq!(tally.abandoned, 1);
    }

    #[test]
    fn test_progress_observer_lifecycle() {
        let mut observer = ProgressObserver::new();
        observer.on_start(2).unwrap();
        observer.on_game_end(0, Some(GameOutcome::Draw)).unwrap();
        observer.on_game_end(1, None).unwrap();
        observer.on_end().unwrap();
        assert_eq!(observer.tally.draws, 1);
    }

    #[test]
    fn test_log_observer_disabled_interval() {
        let mut observer = LogObserver::new(0);
        observer.on_start(3).unwrap();
        for game in 0..3 {
            observer.on_game_end(game, Some(GameOutcome::Win(Player::X))).unwrap();
        }
        assert_eq!(observer.tally.x_wins, 3);
    }
}
