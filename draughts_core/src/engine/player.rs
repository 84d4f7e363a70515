use crate::engine::config::EngineConfig;
use crate::engine::eval::score_quiet_move;
use crate::engine::move_list::MoveList;
use crate::engine::search::AlphaBetaEngine;
use crate::engine::{Difficulty, Move, SearchLimit, SearchStats};
use crate::logic::game::GameState;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cmp::Reverse;
use std::sync::Arc;
use web_time::Instant;

/// Chooses moves for the side to move at one of three strengths. Never
/// touches the caller's game.
pub struct ComputerPlayer {
    config: Arc<EngineConfig>,
    engine: AlphaBetaEngine,
    rng: StdRng,
}

impl ComputerPlayer {
    pub fn new(config: EngineConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let config = Arc::new(config);
        Self {
            engine: AlphaBetaEngine::new(config.clone()),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn select_move(&mut self, game: &GameState, difficulty: Difficulty) -> Option<Move> {
        self.select_move_with_stats(game, difficulty).0
    }

    pub fn select_move_with_stats(
        &mut self,
        game: &GameState,
        difficulty: Difficulty,
    ) -> (Option<Move>, SearchStats) {
        if game.is_over() {
            return (None, SearchStats::default());
        }

        let start = Instant::now();
        let moves = game.all_moves();
        let candidates = u32::try_from(moves.len()).unwrap_or(u32::MAX);

        let (mv, mut stats) = match difficulty {
            Difficulty::Easy => (self.pick_easy(&moves), SearchStats::default()),
            Difficulty::Medium => (
                self.pick_medium(game, &moves),
                SearchStats {
                    depth: 1,
                    ..SearchStats::default()
                },
            ),
            Difficulty::Hard => {
                let limit = SearchLimit {
                    depth: self.config.search_depth,
                    time_ms: self.config.time_limit_ms,
                    nodes: None,
                };
                return self.engine.search_with_stats(game, limit);
            }
        };

        stats.nodes = candidates;
        #[allow(clippy::cast_possible_truncation)]
        {
            stats.time_ms = start.elapsed().as_millis() as u64;
        }
        if let Some(mv) = mv {
            debug!("{} {difficulty:?} player picked {mv} of {candidates}", game.turn());
        }
        (mv, stats)
    }

    fn pick_easy(&mut self, moves: &MoveList) -> Option<Move> {
        let chance = self.config.easy_miss_capture_chance.clamp(0.0, 1.0);
        if !self.rng.gen_bool(chance) {
            let captures: Vec<Move> = moves.iter().filter(|mv| mv.is_capture()).copied().collect();
            if let Some(mv) = captures.choose(&mut self.rng) {
                return Some(*mv);
            }
        }
        moves.as_slice().choose(&mut self.rng).copied()
    }

    fn pick_medium(&mut self, game: &GameState, moves: &MoveList) -> Option<Move> {
        let captures: Vec<Move> = moves.iter().filter(|mv| mv.is_capture()).copied().collect();
        if !captures.is_empty() {
            return captures.choose(&mut self.rng).copied();
        }

        let mut scored: Vec<(Move, i32)> = moves
            .iter()
            .map(|mv| (*mv, score_quiet_move(game.board(), mv, &self.config)))
            .collect();
        scored.sort_by_key(|&(_, score)| Reverse(score));

        let top = top_count(scored.len(), self.config.medium_top_fraction);
        scored
            .get(..top)
            .and_then(|best| best.choose(&mut self.rng))
            .map(|&(mv, _)| mv)
    }
}

/// How many of `len` ranked candidates stay in the draw: `floor(len * fraction)`, at least one.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn top_count(len: usize, fraction: f64) -> usize {
    let top = (len as f64 * fraction.clamp(0.0, 1.0)).floor() as usize;
    top.clamp(1, len.max(1))
}
