//! Observer port - hooks for watching training runs and matches
//!
//! Observers collect progress and statistics without coupling the game
//! loops to a particular output.

use crate::{Result, tictactoe::GameOutcome};

/// Observer for a sequence of games
///
/// Methods are called in order: `on_start` once, then `on_game_end` after
/// each game, then `on_end` once. Abandoned games (a move source had no move)
/// report `None` as their outcome.
///
/// # Examples
///
/// ```
/// use noughts::{ports::Observer, tictactoe::GameOutcome};
///
/// struct Counter(usize);
///
/// impl Observer for Counter {
///     fn on_game_end(&mut self, _game_num: usize, _outcome: Option<GameOutcome>) -> noughts::Result<()> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first game
    fn on_start(&mut self, _total_games: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each game
    fn on_game_end(&mut self, _game_num: usize, _outcome: Option<GameOutcome>) -> Result<()> {
        Ok(())
    }

    /// Called once after the last game
    fn on_end(&mut self) -> Result<()> {
        Ok(())
    }
}
