//! Ports - trait boundaries between the core and its collaborators
//!
//! - [`GameState`]: the capability set the exact solver searches over
//! - [`MoveSource`]: anything that can pick a move for a seat
//! - [`Observer`]: training and match progress hooks

pub mod game_state;
pub mod observer;
pub mod opponent;

pub use game_state::GameState;
pub use observer::Observer;
pub use opponent::MoveSource;
