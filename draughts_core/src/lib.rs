//! English draughts: board model, rule enforcement, move log and a
//! difficulty-tiered computer opponent.

pub mod engine;
pub mod error;
pub mod logic;
pub mod worker;

pub use engine::config::EngineConfig;
pub use engine::player::ComputerPlayer;
pub use engine::{Difficulty, Move};
pub use error::StateError;
pub use logic::board::{Board, Color, Piece, Square};
pub use logic::game::{GameSnapshot, GameState, GameStatus, MoveResult};
pub use logic::history::GameHistory;
