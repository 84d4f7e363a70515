use crate::engine::config::EngineConfig;
use crate::engine::player::ComputerPlayer;
use crate::engine::{Difficulty, Move, SearchStats};
use crate::logic::game::GameState;
use gloo_worker::{HandlerId, Worker, WorkerScope};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub enum Input {
    SelectMove(GameState, Difficulty, EngineConfig),
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    /// `None` when the side to move has nothing to play or the deadline hit first.
    MoveSelected(Option<Move>, SearchStats),
}

/// Runs move selection off the caller's thread. The player is rebuilt only
/// when the config changes so a seeded RNG keeps its stream across requests.
#[derive(Default)]
pub struct SearchWorker {
    player: Option<ComputerPlayer>,
}

impl SearchWorker {
    pub fn compute(&mut self, msg: Input) -> Output {
        match msg {
            Input::SelectMove(game_state, difficulty, config) => {
                let player = match self.player.take() {
                    Some(player) if *player.config() == config => player,
                    _ => {
                        debug!("search worker (re)building player");
                        ComputerPlayer::new(config)
                    }
                };
                let player = self.player.insert(player);
                let (mv, stats) = player.select_move_with_stats(&game_state, difficulty);
                Output::MoveSelected(mv, stats)
            }
        }
    }
}

impl Worker for SearchWorker {
    type Input = Input;
    type Message = ();
    type Output = Output;

    fn create(_scope: &WorkerScope<Self>) -> Self {
        Self::default()
    }

    fn update(&mut self, _scope: &WorkerScope<Self>, _msg: Self::Message) {}

    fn received(&mut self, scope: &WorkerScope<Self>, msg: Self::Input, id: HandlerId) {
        scope.respond(id, self.compute(msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::{Board, Color, Piece, Square};

    fn config() -> EngineConfig {
        EngineConfig {
            seed: Some(21),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_compute_selects_legal_move() {
        let game = GameState::new();
        let mut worker = SearchWorker::default();
        let Output::MoveSelected(mv, stats) =
            worker.compute(Input::SelectMove(game.clone(), Difficulty::Hard, config()));
        let mv = mv.unwrap();
        assert!(game.all_moves().contains(&mv));
        assert_eq!(stats.depth, 3);
    }

    #[test]
    fn test_compute_reports_no_move_when_stuck() {
        // Black has no pieces left to move.
        let mut board = Board::empty();
        board.put(Square::new(2, 1).unwrap(), Some(Piece::man(Color::White)));
        let stuck = GameState::with_board(board, Color::Black);

        let mut worker = SearchWorker::default();
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let Output::MoveSelected(mv, _) =
                worker.compute(Input::SelectMove(stuck.clone(), difficulty, config()));
            assert!(mv.is_none());
        }
    }

    #[test]
    fn test_input_rejects_invalid_state() {
        let request = Input::SelectMove(GameState::new(), Difficulty::Hard, config());
        let mut value = serde_json::to_value(&request).unwrap();
        assert!(serde_json::from_value::<Input>(value.clone()).is_ok());

        let state = &mut value["SelectMove"][0];
        state["chain"] = serde_json::json!({ "row": 9, "col": 9 });
        assert!(serde_json::from_value::<Input>(value.clone()).is_err());

        // In range, but no white piece there to continue a chain.
        value["SelectMove"][0]["chain"] = serde_json::json!({ "row": 4, "col": 3 });
        assert!(serde_json::from_value::<Input>(value).is_err());
    }

    #[test]
    fn test_same_config_keeps_rng_stream() {
        let game = GameState::new();
        let mut worker = SearchWorker::default();
        let mut player = ComputerPlayer::new(config());

        for _ in 0..4 {
            let Output::MoveSelected(from_worker, _) =
                worker.compute(Input::SelectMove(game.clone(), Difficulty::Easy, config()));
            assert_eq!(from_worker, player.select_move(&game, Difficulty::Easy));
        }
    }
}
