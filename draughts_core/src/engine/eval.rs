use crate::engine::config::EngineConfig;
use crate::engine::{Evaluator, Move};
use crate::logic::board::{Board, Color, Piece, Square};
use crate::logic::game::GameState;
use crate::logic::generator::MoveGenerator;
use std::sync::Arc;

/// Rows a man of `color` has travelled from its own back row when standing on `sq`.
pub fn advancement(color: Color, sq: Square) -> i32 {
    let row = i32::from(sq.row());
    match color {
        Color::White => row,
        Color::Black => 7 - row,
    }
}

/// Doubled centre proximity: `2 * (7 - manhattan distance to (3.5, 3.5))`.
pub const fn center_proximity_x2(sq: Square) -> i32 {
    14 - sq.center_distance_x2()
}

fn move_count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Leaf evaluation for the lookahead search, in quarter points.
pub struct PositionEvaluator {
    config: Arc<EngineConfig>,
}

impl PositionEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    fn piece_value(&self, sq: Square, piece: Piece) -> i32 {
        let mut value = if piece.is_king {
            self.config.val_king
        } else {
            self.config.val_man.saturating_add(
                advancement(piece.color, sq).saturating_mul(self.config.advance_weight),
            )
        };
        value = value
            .saturating_add(center_proximity_x2(sq).saturating_mul(self.config.center_weight));
        if sq.is_edge_column() {
            value = value.saturating_sub(self.config.edge_penalty);
        }
        value
    }
}

impl Evaluator for PositionEvaluator {
    fn evaluate(&self, state: &GameState, perspective: Color, last_move: Option<&Move>) -> i32 {
        let board = state.board();
        let generator = MoveGenerator::new();

        let mut score: i32 = 0;
        for sq in Square::all() {
            if let Some(piece) = board.piece_at(sq) {
                let value = self.piece_value(sq, piece);
                score = if piece.color == perspective {
                    score.saturating_add(value)
                } else {
                    score.saturating_sub(value)
                };
            }
        }

        let own = generator.all_moves(board, None, perspective).len();
        let theirs = generator.all_moves(board, None, perspective.opposite()).len();
        score = score.saturating_add(
            (move_count(own) - move_count(theirs)).saturating_mul(self.config.mobility_weight),
        );

        if let Some(mv) = last_move.filter(|mv| mv.is_capture()) {
            // The capturing piece now stands on the landing square.
            let mover = board.piece_at(mv.to).map(|p| p.color);
            if mover == Some(perspective) {
                score = score.saturating_add(self.config.capture_bonus);
            } else if mover.is_some() {
                score = score.saturating_sub(self.config.capture_bonus);
            }
        }

        score
    }
}

/// Half-point score of a non-capturing move for the medium player.
///
/// Rewards advancing men, central squares and landing next to a friend;
/// penalises edge columns and squares the opponent could jump straight away.
pub fn score_quiet_move(board: &Board, mv: &Move, config: &EngineConfig) -> i32 {
    let Some(piece) = board.piece_at(mv.from) else {
        return 0;
    };
    let to = mv.to;

    let mut score: i32 = 0;
    if !piece.is_king {
        score = advancement(piece.color, to).saturating_mul(config.heuristic_advance);
    }
    score =
        score.saturating_add(center_proximity_x2(to).saturating_mul(config.heuristic_center));
    if to.is_edge_column() {
        score = score.saturating_sub(config.heuristic_edge_penalty);
    }

    let mut scratch = *board;
    scratch.take(mv.from);
    scratch.put(to, Some(piece));
    if MoveGenerator::new().is_attacked(&scratch, to) {
        score = score.saturating_sub(config.heuristic_danger_penalty);
    }

    let supported = board
        .pieces(piece.color)
        .any(|(sq, _)| sq != mv.from && sq.manhattan(to) <= config.support_radius);
    if supported {
        score = score.saturating_add(config.heuristic_support_bonus);
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: i32, col: i32) -> Square {
        Square::new(row, col).unwrap()
    }

    fn evaluator() -> PositionEvaluator {
        PositionEvaluator::new(Arc::new(EngineConfig::default()))
    }

    #[test]
    fn test_initial_position_is_balanced() {
        let game = GameState::new();
        let eval = evaluator();
        assert_eq!(eval.evaluate(&game, Color::White, None), 0);
        assert_eq!(eval.evaluate(&game, Color::Black, None), 0);
    }

    #[test]
    fn test_material_and_perspective() {
        let mut board = Board::empty();
        board.put(sq(3, 2), Some(Piece::king(Color::White)));
        board.put(sq(4, 5), Some(Piece::man(Color::Black)));
        let game = GameState::with_board(board, Color::White);
        let eval = evaluator();

        let white = eval.evaluate(&game, Color::White, None);
        let black = eval.evaluate(&game, Color::Black, None);
        assert!(white > 0);
        assert_eq!(white, -black);
    }

    #[test]
    fn test_extreme_weights_saturate() {
        let config = EngineConfig {
            val_man: i32::MAX,
            val_king: i32::MAX,
            center_weight: i32::MAX,
            mobility_weight: i32::MIN,
            heuristic_advance: i32::MAX,
            heuristic_center: i32::MAX,
            ..EngineConfig::default()
        };
        let game = GameState::new();
        let eval = PositionEvaluator::new(Arc::new(config.clone()));
        // Must not overflow for either side.
        eval.evaluate(&game, Color::White, None);
        eval.evaluate(&game, Color::Black, Some(&Move::quiet(sq(2, 1), sq(3, 2))));

        let mv = Move::quiet(sq(2, 1), sq(3, 2));
        assert_eq!(score_quiet_move(game.board(), &mv, &config), i32::MAX);
    }

    #[test]
    fn test_capture_bonus_signed_by_mover() {
        let mut board = Board::empty();
        board.put(sq(4, 3), Some(Piece::man(Color::White)));
        board.put(sq(6, 1), Some(Piece::man(Color::Black)));
        let game = GameState::with_board(board, Color::Black);
        let eval = evaluator();
        let jump = Move::capture(sq(2, 1), sq(3, 2), sq(4, 3));

        let plain = eval.evaluate(&game, Color::White, None);
        let config = EngineConfig::default();
        assert_eq!(
            eval.evaluate(&game, Color::White, Some(&jump)),
            plain + config.capture_bonus
        );
        assert_eq!(
            eval.evaluate(&game, Color::Black, Some(&jump)),
            -plain - config.capture_bonus
        );
    }

    #[test]
    fn test_quiet_move_danger_penalty() {
        let config = EngineConfig::default();
        let mut board = Board::empty();
        board.put(sq(2, 1), Some(Piece::man(Color::White)));
        board.put(sq(4, 1), Some(Piece::man(Color::Black)));

        // c4 sits right in front of the black man on b5 with d3 empty behind.
        let exposed = score_quiet_move(&board, &Move::quiet(sq(2, 1), sq(3, 2)), &config);
        let safe = score_quiet_move(&board, &Move::quiet(sq(2, 1), sq(3, 0)), &config);

        let expected_exposed =
            3 * config.heuristic_advance + (14 - 4) - config.heuristic_danger_penalty;
        // a4 cannot be jumped: the landing square is off the board.
        let expected_safe = 3 * config.heuristic_advance + (14 - 8) - config.heuristic_edge_penalty;
        assert_eq!(exposed, expected_exposed);
        assert_eq!(safe, expected_safe);
    }

    #[test]
    fn test_quiet_move_support_ignores_origin() {
        let config = EngineConfig::default();
        let mut board = Board::empty();
        board.put(sq(2, 1), Some(Piece::man(Color::White)));
        let alone = score_quiet_move(&board, &Move::quiet(sq(2, 1), sq(3, 2)), &config);

        board.put(sq(2, 3), Some(Piece::man(Color::White)));
        let escorted = score_quiet_move(&board, &Move::quiet(sq(2, 1), sq(3, 2)), &config);
        assert_eq!(escorted - alone, config.heuristic_support_bonus);
    }

    #[test]
    fn test_advancement_direction() {
        assert_eq!(advancement(Color::White, sq(0, 1)), 0);
        assert_eq!(advancement(Color::White, sq(6, 1)), 6);
        assert_eq!(advancement(Color::Black, sq(7, 0)), 0);
        assert_eq!(advancement(Color::Black, sq(1, 0)), 6);
    }
}
