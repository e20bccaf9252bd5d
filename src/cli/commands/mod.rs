//! One module per subcommand, each exposing its clap args and `execute`

pub mod analyze;
pub mod matchup;
pub mod play;
pub mod self_play;
pub mod train;
