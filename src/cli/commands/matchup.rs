//! Matchup command - Play any two participants against each other

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::{
        config::{CommonArgs, OpponentSpec},
        output::{print_match_report, print_section},
    },
    config::TrainingConfig,
    training::TrainingPipeline,
};

#[derive(Parser, Debug)]
#[command(about = "Play a series of games between two participants")]
pub struct MatchupArgs {
    /// X player: minimax, random, buggy, buggy2 or a policy file
    pub x: OpponentSpec,

    /// O player: minimax, random, buggy, buggy2 or a policy file
    pub o: OpponentSpec,

    /// Number of games to play
    #[arg(long, short = 'g', default_value_t = 100)]
    pub games: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: MatchupArgs) -> Result<()> {
    if args.games == 0 {
        anyhow::bail!("Number of games must be positive");
    }

    let mut x = args.x.build(args.common.seed)?;
    let mut o = args
        .o
        .build(args.common.seed.map(|seed| seed.wrapping_add(1)))?;

    let mut config = TrainingConfig::new(args.games).with_progress(!args.common.no_progress);
    if let Some(seed) = args.common.seed {
        config = config.with_seed(seed);
    }

    let report = TrainingPipeline::new(config).play_match(x.as_mut(), o.as_mut())?;

    print_section(&format!("{} (X) vs {} (O)", args.x, args.o));
    print_match_report(&report, &args.x.to_string(), &args.o.to_string());
    Ok(())
}
