//! Errors raised when restoring externally supplied game state.

use crate::logic::board::{Color, Square};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("square ({row}, {col}) is off the board")]
    OffBoard { row: i32, col: i32 },

    #[error("piece on light square {square}")]
    LightSquare { square: Square },

    #[error("{color} has {count} pieces (at most 12 allowed)")]
    TooManyPieces { color: Color, count: usize },

    #[error("uncrowned {color} man resting on its promotion row at {square}")]
    UncrownedOnPromotionRow { color: Color, square: Square },

    #[error("chain square {square} does not hold a piece of the side to move")]
    ChainPieceMissing { square: Square },

    #[error("chain piece on {square} has no capture to continue with")]
    ChainWithoutCapture { square: Square },

    #[error("game marked won by {winner} but the losing side can still move")]
    InconsistentStatus { winner: Color },

    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StateResult<T> = Result<T, StateError>;
