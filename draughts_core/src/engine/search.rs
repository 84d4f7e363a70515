use crate::engine::config::EngineConfig;
use crate::engine::eval::PositionEvaluator;
use crate::engine::{Evaluator, Move, SearchLimit, SearchStats, Searcher};
use crate::logic::board::Color;
use crate::logic::game::{GameSnapshot, GameState};
use log::{debug, warn};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use web_time::{Duration, Instant};

/// Scratch-state guard: every change made through it is rolled back when it
/// goes out of scope, whichever way the branch is left.
struct Simulation<'a> {
    state: &'a mut GameState,
    saved: GameSnapshot,
}

impl<'a> Simulation<'a> {
    fn new(state: &'a mut GameState) -> Self {
        let saved = state.get_board_state();
        Self { state, saved }
    }
}

impl Deref for Simulation<'_> {
    type Target = GameState;

    fn deref(&self) -> &GameState {
        self.state
    }
}

impl DerefMut for Simulation<'_> {
    fn deref_mut(&mut self) -> &mut GameState {
        self.state
    }
}

impl Drop for Simulation<'_> {
    fn drop(&mut self) {
        self.state.restore(&self.saved);
    }
}

/// Fixed-depth minimax over single steps; a chain continuation is a ply of
/// its own with the same side to move.
pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    evaluator: PositionEvaluator,
    nodes_searched: u32,
    start_time: Instant,
    deadline: Option<Instant>,
    node_budget: Option<u32>,
    timed_out: bool,
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            evaluator: PositionEvaluator::new(config.clone()),
            config,
            nodes_searched: 0,
            start_time: Instant::now(),
            deadline: None,
            node_budget: None,
            timed_out: false,
        }
    }

    fn check_limits(&mut self) -> bool {
        if self
            .node_budget
            .is_some_and(|budget| self.nodes_searched > budget)
        {
            self.timed_out = true;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.timed_out = true;
            }
        }
        self.timed_out
    }

    fn terminal_score(&self, winner: Color, perspective: Color) -> i32 {
        if winner == perspective {
            self.config.win_score
        } else {
            self.config.win_score.saturating_neg()
        }
    }

    /// Plays `mv` on the guarded state and scores the result. `None` means
    /// a limit was hit somewhere below.
    fn score_move(
        &mut self,
        state: &mut GameState,
        mv: &Move,
        depth: u8,
        alpha: i32,
        beta: i32,
        perspective: Color,
    ) -> Option<i32> {
        let mut sim = Simulation::new(state);
        let Some(result) = sim.play(mv) else {
            // Generated moves are always legal; treat a refusal as a dead branch.
            return Some(self.terminal_score(sim.turn().opposite(), perspective));
        };

        if let Some(winner) = sim.winner() {
            return Some(self.terminal_score(winner, perspective));
        }
        if !result.can_continue_capture {
            sim.switch_turn();
        }
        self.minimax(&mut sim, depth, alpha, beta, perspective, Some(mv))
    }

    fn minimax(
        &mut self,
        state: &mut GameState,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        perspective: Color,
        last_move: Option<&Move>,
    ) -> Option<i32> {
        self.nodes_searched += 1;
        if self.check_limits() {
            return None;
        }

        if depth == 0 {
            return Some(self.evaluator.evaluate(state, perspective, last_move));
        }

        let moves = state.all_moves();
        if moves.is_empty() {
            return Some(self.terminal_score(state.turn().opposite(), perspective));
        }

        let maximizing = state.turn() == perspective;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };

        for mv in &moves {
            let score = self.score_move(state, mv, depth - 1, alpha, beta, perspective)?;
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if self.config.alpha_beta && alpha >= beta {
                break;
            }
        }

        Some(best)
    }

    /// Like [`Searcher::search`] but reports statistics even when no move
    /// could be chosen in time.
    pub fn search_with_stats(
        &mut self,
        game_state: &GameState,
        limit: SearchLimit,
    ) -> (Option<Move>, SearchStats) {
        self.nodes_searched = 0;
        self.timed_out = false;
        self.start_time = Instant::now();
        self.deadline = limit
            .time_ms
            .map(|ms| self.start_time + Duration::from_millis(ms));
        self.node_budget = limit.nodes;

        let depth = limit.depth.max(1);
        let perspective = game_state.turn();
        let mut state = game_state.clone();

        let mut best_move = None;
        let mut best_score = i32::MIN;

        if !state.is_over() {
            for mv in &state.all_moves() {
                // Root window stays open above: only the lower bound tightens.
                let alpha = if self.config.alpha_beta {
                    best_score
                } else {
                    i32::MIN
                };
                let Some(score) =
                    self.score_move(&mut state, mv, depth - 1, alpha, i32::MAX, perspective)
                else {
                    break;
                };
                if best_move.is_none() || score > best_score {
                    best_score = score;
                    best_move = Some(*mv);
                }
            }
        }

        let elapsed = self.start_time.elapsed();
        #[allow(clippy::cast_possible_truncation)]
        let stats = SearchStats {
            depth,
            nodes: self.nodes_searched,
            time_ms: elapsed.as_millis() as u64,
            timed_out: self.timed_out,
        };

        if stats.timed_out {
            warn!(
                "{perspective} search cut short after {} nodes ({} ms)",
                stats.nodes, stats.time_ms
            );
        }
        if let Some(mv) = best_move {
            debug!(
                "{perspective} search picked {mv} (score {best_score}, {} nodes)",
                stats.nodes
            );
        }

        (best_move, stats)
    }
}

impl Searcher for AlphaBetaEngine {
    fn search(
        &mut self,
        game_state: &GameState,
        limit: SearchLimit,
    ) -> Option<(Move, SearchStats)> {
        let (best_move, stats) = self.search_with_stats(game_state, limit);
        best_move.map(|mv| (mv, stats))
    }
}
