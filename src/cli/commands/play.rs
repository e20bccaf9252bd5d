//! Play command - Interactive game against the computer

use std::io::{self, BufReader};

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::config::OpponentSpec,
    opponents::HumanOpponent,
    ports::MoveSource,
    tictactoe::{Board, GameOutcome, Player},
};

#[derive(Parser, Debug)]
#[command(about = "Play an interactive game")]
pub struct PlayArgs {
    /// Computer player: minimax, random, buggy, buggy2 or a policy file
    #[arg(long, short = 'o', default_value = "minimax")]
    pub opponent: OpponentSpec,

    /// Play second (as O) instead of first
    #[arg(long)]
    pub second: bool,

    /// Random seed for the computer player
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let mut computer = args.opponent.build(args.seed)?;
    let mut human = HumanOpponent::new(BufReader::new(io::stdin()), io::stdout());
    let human_seat = if args.second { Player::O } else { Player::X };

    println!(
        "You are {human_seat}, {} is {}. Coordinates are x y with (0,0) bottom-left.",
        computer.name(),
        human_seat.opponent()
    );

    let mut board = Board::new();
    let mut current = Player::X;
    while !board.is_game_over() {
        let source: &mut dyn MoveSource = if current == human_seat {
            &mut human
        } else {
            computer.as_mut()
        };
        let Some(mv) = source.next_move(&board, current) else {
            println!("\n{current} cannot move; game abandoned.");
            return Ok(());
        };
        if !board.make_move(mv.x, mv.y, current) {
            println!("\nMove {mv} was rejected; game abandoned.");
            return Ok(());
        }
        if current != human_seat {
            println!("\n{} plays {mv}", computer.name());
        }
        current = current.opponent();
    }

    println!("\n{board}");
    match board.outcome() {
        Some(GameOutcome::Win(winner)) if winner == human_seat => println!("You win!"),
        Some(GameOutcome::Win(_)) => println!("{} wins.", computer.name()),
        _ => println!("It's a draw."),
    }
    Ok(())
}
