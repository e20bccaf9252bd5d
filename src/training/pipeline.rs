//! Training loops and head-to-head matches

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    config::TrainingConfig,
    ports::{MoveSource, Observer},
    q_learning::QLearningAgent,
    tictactoe::{Board, GameOutcome, Move, Player},
    training::observers::{LogObserver, ProgressObserver},
};

/// Result of training an agent against an opponent, from the agent's side
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingReport {
    pub episodes: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    /// Episodes that ended because the opponent had no usable move
    pub abandoned: usize,
    /// Rows in the agent's table after training
    pub table_size: usize,
}

impl TrainingReport {
    fn record(&mut self, outcome: Option<GameOutcome>, agent: Player) {
        self.episodes += 1;
        match outcome {
            Some(GameOutcome::Win(winner)) if winner == agent => self.wins += 1,
            Some(GameOutcome::Win(_)) => self.losses += 1,
            Some(GameOutcome::Draw) => self.draws += 1,
            None => self.abandoned += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        rate(self.wins, self.episodes)
    }

    pub fn draw_rate(&self) -> f64 {
        rate(self.draws, self.episodes)
    }

    pub fn loss_rate(&self) -> f64 {
        rate(self.losses, self.episodes)
    }
}

/// Result of a series of games between two sides
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchReport {
    pub games: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    pub abandoned: usize,
    /// Number of different final boards among finished games
    pub distinct_finals: usize,
}

impl MatchReport {
    pub fn x_win_rate(&self) -> f64 {
        rate(self.x_wins, self.games)
    }

    pub fn o_win_rate(&self) -> f64 {
        rate(self.o_wins, self.games)
    }

    pub fn draw_rate(&self) -> f64 {
        rate(self.draws, self.games)
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Tracks outcomes and final boards across a series
#[derive(Default)]
struct MatchTally {
    report: MatchReport,
    finals: HashSet<String>,
}

impl MatchTally {
    fn record(&mut self, outcome: Option<GameOutcome>, board: &Board) {
        self.report.games += 1;
        match outcome {
            Some(GameOutcome::Win(Player::X)) => self.report.x_wins += 1,
            Some(GameOutcome::Win(Player::O)) => self.report.o_wins += 1,
            Some(GameOutcome::Draw) => self.report.draws += 1,
            None => {
                self.report.abandoned += 1;
                return;
            }
        }
        self.finals.insert(board.encode());
    }

    fn finish(mut self) -> MatchReport {
        self.report.distinct_finals = self.finals.len();
        self.report
    }
}

/// Apply an action chosen by an agent; agents only pick free cells
fn apply_action(board: &mut Board, action: usize, player: Player) -> Result<()> {
    let mv = Move::from_action(action).ok_or(Error::InvalidAction { action })?;
    if board.make_move(mv.x, mv.y, player) {
        Ok(())
    } else {
        Err(Error::InvalidMove { x: mv.x, y: mv.y })
    }
}

/// Ask `source` for a move and apply it. `false` when the turn could not be
/// taken, which ends the game.
fn take_turn(board: &mut Board, source: &mut dyn MoveSource, player: Player) -> bool {
    let Some(mv) = source.next_move(board, player) else {
        log::debug!("{} has no move for {player}", source.name());
        return false;
    };
    if board.make_move(mv.x, mv.y, player) {
        true
    } else {
        log::warn!("{} proposed rejected move {mv} for {player}", source.name());
        false
    }
}

/// Drives games between agents and move sources, notifying observers
///
/// Every loop plays `config.episodes` games. When the configuration carries
/// a seed, the participants are reseeded from it before the first game.
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a pipeline with the observers the configuration asks for
    pub fn new(config: TrainingConfig) -> Self {
        let mut observers: Vec<Box<dyn Observer>> = Vec::new();
        if config.progress {
            observers.push(Box::new(ProgressObserver::new()));
        }
        if config.log_every > 0 {
            observers.push(Box::new(LogObserver::new(config.log_every)));
        }
        Self { config, observers }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train `agent` as X against `opponent` as O.
    ///
    /// After each agent move that ends the game the agent receives a terminal
    /// update with the final reward. Otherwise the opponent replies and the
    /// agent is updated toward the position it faces next, terminal if the
    /// reply ended the game.
    pub fn train_against(
        &mut self,
        agent: &mut QLearningAgent,
        opponent: &mut dyn MoveSource,
    ) -> Result<TrainingReport> {
        if let Some(seed) = self.config.seed {
            agent.reseed(seed);
            opponent.set_rng_seed(seed.wrapping_add(1));
        }
        log::info!(
            "training against {} for {} episodes",
            opponent.name(),
            self.config.episodes
        );

        let mut report = TrainingReport {
            episodes: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            abandoned: 0,
            table_size: 0,
        };
        self.notify_start()?;
        for episode in 0..self.config.episodes {
            let outcome = train_episode(agent, opponent)?;
            report.record(outcome, Player::X);
            self.notify_game_end(episode, outcome)?;
        }
        self.notify_end()?;

        report.table_size = agent.table().len();
        Ok(report)
    }

    /// Two agents learn by playing each other, `agent_x` opening.
    ///
    /// Each agent updates only its own moves, bootstrapping from the
    /// position right after its move.
    pub fn train_self_play(
        &mut self,
        agent_x: &mut QLearningAgent,
        agent_o: &mut QLearningAgent,
    ) -> Result<MatchReport> {
        if let Some(seed) = self.config.seed {
            agent_x.reseed(seed);
            agent_o.reseed(seed.wrapping_add(1));
        }
        log::info!("self-play training for {} episodes", self.config.episodes);

        let mut tally = MatchTally::default();
        self.notify_start()?;
        for episode in 0..self.config.episodes {
            let (outcome, board) = self_play_episode(agent_x, agent_o)?;
            tally.record(outcome, &board);
            self.notify_game_end(episode, outcome)?;
        }
        self.notify_end()?;
        Ok(tally.finish())
    }

    /// Play games between two move sources without learning
    pub fn play_match(
        &mut self,
        x: &mut dyn MoveSource,
        o: &mut dyn MoveSource,
    ) -> Result<MatchReport> {
        if let Some(seed) = self.config.seed {
            x.set_rng_seed(seed);
            o.set_rng_seed(seed.wrapping_add(1));
        }
        log::info!(
            "{} (X) vs {} (O) for {} games",
            x.name(),
            o.name(),
            self.config.episodes
        );

        let mut tally = MatchTally::default();
        self.notify_start()?;
        for game in 0..self.config.episodes {
            let (outcome, board) = play_game(x, o);
            tally.record(outcome, &board);
            self.notify_game_end(game, outcome)?;
        }
        self.notify_end()?;
        Ok(tally.finish())
    }

    fn notify_start(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_start(self.config.episodes)?;
        }
        Ok(())
    }

    fn notify_game_end(&mut self, game_num: usize, outcome: Option<GameOutcome>) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_game_end(game_num, outcome)?;
        }
        Ok(())
    }

    fn notify_end(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_end()?;
        }
        Ok(())
    }
}

fn train_episode(
    agent: &mut QLearningAgent,
    opponent: &mut dyn MoveSource,
) -> Result<Option<GameOutcome>> {
    let seat = Player::X;
    let mut board = Board::new();

    loop {
        let state = QLearningAgent::encode_board(&board);
        let Some(action) = agent.choose_action(&board) else {
            return Ok(board.outcome());
        };
        apply_action(&mut board, action, seat)?;

        if let Some(outcome) = board.outcome() {
            agent.update_q(&state, action, None, outcome.reward_for(seat), true)?;
            return Ok(Some(outcome));
        }

        if !take_turn(&mut board, opponent, seat.opponent()) {
            return Ok(None);
        }

        let next = QLearningAgent::encode_board(&board);
        match board.outcome() {
            Some(outcome) => {
                agent.update_q(&state, action, Some(&next), outcome.reward_for(seat), true)?;
                return Ok(Some(outcome));
            }
            None => agent.update_q(&state, action, Some(&next), 0.0, false)?,
        }
    }
}

fn self_play_episode(
    agent_x: &mut QLearningAgent,
    agent_o: &mut QLearningAgent,
) -> Result<(Option<GameOutcome>, Board)> {
    let mut board = Board::new();
    let mut current = Player::X;

    loop {
        let agent = match current {
            Player::X => &mut *agent_x,
            Player::O => &mut *agent_o,
        };

        let state = QLearningAgent::encode_board(&board);
        let Some(action) = agent.choose_action(&board) else {
            return Ok((board.outcome(), board));
        };
        apply_action(&mut board, action, current)?;

        if let Some(outcome) = board.outcome() {
            agent.update_q(&state, action, None, outcome.reward_for(current), true)?;
            return Ok((Some(outcome), board));
        }
        let next = QLearningAgent::encode_board(&board);
        agent.update_q(&state, action, Some(&next), 0.0, false)?;

        current = current.opponent();
    }
}

fn play_game(x: &mut dyn MoveSource, o: &mut dyn MoveSource) -> (Option<GameOutcome>, Board) {
    let mut board = Board::new();
    let mut current = Player::X;

    while !board.is_game_over() {
        let source: &mut dyn MoveSource = match current {
            Player::X => &mut *x,
            Player::O => &mut *o,
        };
        if !take_turn(&mut board, source, current) {
            return (None, board);
        }
        current = current.opponent();
    }
    (board.outcome(), board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Hyperparameters,
        opponents::{MinimaxOpponent, RandomOpponent},
        solver::TieBreak,
    };

    fn agent(epsilon: f64) -> QLearningAgent {
        QLearningAgent::new(Hyperparameters::default().with_epsilon(epsilon)).unwrap()
    }

    /// Plays a fixed script of moves, then gives up
    struct Scripted(Vec<Move>);

    impl MoveSource for Scripted {
        fn next_move(&mut self, _board: &Board, _player: Player) -> Option<Move> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_greedy_agent_against_minimax_never_wins() {
        let mut learner = agent(0.2);
        let mut opponent = MinimaxOpponent::new();
        let mut pipeline = TrainingPipeline::new(TrainingConfig::new(50).with_seed(7));
        let report = pipeline.train_against(&mut learner, &mut opponent).unwrap();

        assert_eq!(report.episodes, 50);
        assert_eq!(report.wins, 0);
        assert_eq!(report.draws + report.losses, 50);
        assert_eq!(report.table_size, learner.table().len());
        assert!(report.table_size > 0);
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let run = || {
            let mut learner = agent(0.3);
            let mut opponent = RandomOpponent::new();
            let mut pipeline = TrainingPipeline::new(TrainingConfig::new(200).with_seed(11));
            let report = pipeline.train_against(&mut learner, &mut opponent).unwrap();
            (report, learner.into_table())
        };
        let (first_report, first_table) = run();
        let (second_report, second_table) = run();
        assert_eq!(first_report, second_report);
        assert_eq!(first_table, second_table);
    }

    #[test]
    fn test_losing_reply_is_penalised() {
        let mut learner = agent(0.0);
        let table = learner.table_mut();
        table.insert("000000000", [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        table.insert("000020100", [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        // Prefers (2,0) over blocking O's column at (1,0)
        table.insert("021020100", [0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let mut opponent = Scripted(vec![Move::new(1, 1), Move::new(1, 2), Move::new(1, 0)]);

        let mut pipeline = TrainingPipeline::new(TrainingConfig::new(1));
        let report = pipeline.train_against(&mut learner, &mut opponent).unwrap();

        assert_eq!(report.losses, 1);
        // 0.5 + 0.1 * (-1 - 0.5)
        let value = learner.table().value("021020100", 2);
        assert!((value - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_opponent_without_move_abandons_episode() {
        let mut learner = agent(0.0);
        let mut opponent = Scripted(Vec::new());
        let mut pipeline = TrainingPipeline::new(TrainingConfig::new(3));
        let report = pipeline.train_against(&mut learner, &mut opponent).unwrap();
        assert_eq!(report.abandoned, 3);
        assert_eq!(report.wins + report.draws + report.losses, 0);
    }

    #[test]
    fn test_self_play_updates_both_tables() {
        let mut x = agent(0.5);
        let mut o = agent(0.5);
        let mut pipeline = TrainingPipeline::new(TrainingConfig::new(100).with_seed(3));
        let report = pipeline.train_self_play(&mut x, &mut o).unwrap();

        assert_eq!(report.games, 100);
        assert_eq!(report.x_wins + report.o_wins + report.draws, 100);
        assert!(report.distinct_finals >= 1);
        assert!(x.table().contains("000000000"));
        assert!(!o.table().contains("000000000"));
    }

    #[test]
    fn test_minimax_mirror_match_always_draws() {
        let mut x = MinimaxOpponent::new();
        let mut o = MinimaxOpponent::new().with_tie_break(TieBreak::First);
        let mut pipeline = TrainingPipeline::new(TrainingConfig::new(10).with_seed(5));
        let report = pipeline.play_match(&mut x, &mut o).unwrap();
        assert_eq!(report.draws, 10);
        assert!(report.distinct_finals >= 1);
    }

    #[test]
    fn test_deterministic_match_has_one_final_board() {
        let mut x = MinimaxOpponent::new().with_tie_break(TieBreak::First);
        let mut o = MinimaxOpponent::new().with_tie_break(TieBreak::First);
        let mut pipeline = TrainingPipeline::new(TrainingConfig::new(4));
        let report = pipeline.play_match(&mut x, &mut o).unwrap();
        assert_eq!(report.games, 4);
        assert_eq!(report.distinct_finals, 1);
    }
}
