use crate::engine::Move;
use crate::error::{StateError, StateResult};
use crate::logic::board::{Board, Color, Square, PIECES_PER_SIDE};
use crate::logic::game::{GameSnapshot, GameState, GameStatus};
use crate::logic::generator::MoveGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    GameOver,
    OutOfBounds,
    NoPieceAtSource,
    NotYourTurn,
    MustContinueChain,
    IllegalMove,
}

/// Checks that `from -> to` is a legal move for the side to move and returns
/// the matching generated move.
pub fn validate_move(state: &GameState, from: Square, to: Square) -> Result<Move, MoveError> {
    if state.is_over() {
        return Err(MoveError::GameOver);
    }

    let piece = state
        .board()
        .piece_at(from)
        .ok_or(MoveError::NoPieceAtSource)?;
    if piece.color != state.turn() {
        return Err(MoveError::NotYourTurn);
    }

    if let Some(chain_sq) = state.chain() {
        if chain_sq != from {
            return Err(MoveError::MustContinueChain);
        }
    }

    MoveGenerator::new()
        .legal_moves(state.board(), state.chain(), from)
        .find_to(to)
        .ok_or(MoveError::IllegalMove)
}

/// Winner when `to_move` is stuck: no pieces left or no legal move.
pub fn winner_if_stuck(board: &Board, to_move: Color) -> Option<Color> {
    let generator = MoveGenerator::new();
    if board.count(to_move) == 0 || !generator.has_any_move(board, to_move) {
        Some(to_move.opposite())
    } else {
        None
    }
}

/// Structural checks on a snapshot before it replaces live state.
pub fn validate_snapshot(snapshot: &GameSnapshot) -> StateResult<()> {
    let board = &snapshot.board;

    for color in [Color::White, Color::Black] {
        let count = board.count(color);
        if count > PIECES_PER_SIDE {
            return Err(StateError::TooManyPieces { color, count });
        }
        for (square, piece) in board.pieces(color) {
            if !square.is_dark() {
                return Err(StateError::LightSquare { square });
            }
            if !piece.is_king && square.row() == color.promotion_row() {
                return Err(StateError::UncrownedOnPromotionRow { color, square });
            }
        }
    }

    if let Some(square) = snapshot.chain {
        let owned = board
            .piece_at(square)
            .is_some_and(|p| p.color == snapshot.turn);
        if !owned {
            return Err(StateError::ChainPieceMissing { square });
        }
        let generator = MoveGenerator::new();
        if generator
            .legal_moves(board, Some(square), square)
            .is_empty()
        {
            return Err(StateError::ChainWithoutCapture { square });
        }
    }

    if let GameStatus::Over { winner } = snapshot.status {
        if winner_if_stuck(board, winner.opposite()).is_none() {
            return Err(StateError::InconsistentStatus { winner });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::Piece;

    fn sq(row: i32, col: i32) -> Square {
        Square::new(row, col).unwrap()
    }

    #[test]
    fn test_validate_rejections() {
        let game = GameState::new();
        assert_eq!(
            validate_move(&game, sq(3, 0), sq(4, 1)),
            Err(MoveError::NoPieceAtSource)
        );
        assert_eq!(
            validate_move(&game, sq(5, 0), sq(4, 1)),
            Err(MoveError::NotYourTurn)
        );
        assert_eq!(
            validate_move(&game, sq(2, 1), sq(4, 1)),
            Err(MoveError::IllegalMove)
        );
        assert_eq!(
            validate_move(&game, sq(2, 1), sq(3, 2)),
            Ok(Move::quiet(sq(2, 1), sq(3, 2)))
        );
    }

    #[test]
    fn test_winner_if_stuck() {
        let mut board = Board::empty();
        assert_eq!(winner_if_stuck(&board, Color::Black), Some(Color::White));

        // Black man boxed in: both steps occupied, both jumps blocked.
        board.put(sq(2, 1), Some(Piece::man(Color::Black)));
        board.put(sq(1, 0), Some(Piece::man(Color::White)));
        board.put(sq(1, 2), Some(Piece::man(Color::White)));
        board.put(sq(0, 3), Some(Piece::man(Color::White)));
        assert_eq!(winner_if_stuck(&board, Color::Black), Some(Color::White));
        assert_eq!(winner_if_stuck(&board, Color::White), None);
    }

    #[test]
    fn test_snapshot_rejects_light_square() {
        let mut snapshot = GameState::new().get_board_state();
        snapshot.board.put(sq(3, 3), Some(Piece::man(Color::White)));
        snapshot.board.put(sq(0, 1), None);
        assert!(matches!(
            validate_snapshot(&snapshot),
            Err(StateError::LightSquare { .. })
        ));
    }

    #[test]
    fn test_snapshot_rejects_thirteenth_piece() {
        let mut snapshot = GameState::new().get_board_state();
        snapshot.board.put(sq(3, 0), Some(Piece::man(Color::White)));
        assert!(matches!(
            validate_snapshot(&snapshot),
            Err(StateError::TooManyPieces {
                color: Color::White,
                count: 13
            })
        ));
    }

    #[test]
    fn test_snapshot_rejects_bogus_chain() {
        let mut snapshot = GameState::new().get_board_state();
        snapshot.chain = Some(sq(2, 1));
        assert!(matches!(
            validate_snapshot(&snapshot),
            Err(StateError::ChainWithoutCapture { .. })
        ));
        snapshot.chain = Some(sq(5, 0));
        assert!(matches!(
            validate_snapshot(&snapshot),
            Err(StateError::ChainPieceMissing { .. })
        ));
    }

    #[test]
    fn test_snapshot_rejects_false_game_over() {
        let mut snapshot = GameState::new().get_board_state();
        snapshot.status = GameStatus::Over {
            winner: Color::White,
        };
        assert!(matches!(
            validate_snapshot(&snapshot),
            Err(StateError::InconsistentStatus { .. })
        ));
    }
}
