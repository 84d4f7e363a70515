use crate::logic::board::{Color, Square};
use crate::logic::game::GameState;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod eval;
pub mod move_list;
pub mod player;
pub mod search;

/// A single step: a quiet diagonal move or one jump of a capture chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub captured: Option<Square>,
}

impl Move {
    #[must_use]
    pub const fn quiet(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            captured: None,
        }
    }

    #[must_use]
    pub const fn capture(from: Square, over: Square, to: Square) -> Self {
        Self {
            from,
            to,
            captured: Some(over),
        }
    }

    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// `c3-d4` for quiet moves, `c3xe5` for captures.
    #[must_use]
    pub fn notation(&self) -> String {
        notation(self.from, self.to, self.is_capture())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

#[must_use]
pub fn notation(from: Square, to: Square, is_capture: bool) -> String {
    let sep = if is_capture { 'x' } else { '-' };
    format!("{from}{sep}{to}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Random play that overlooks captures now and then.
    Easy,
    /// Captures first, otherwise a positional heuristic.
    #[default]
    Medium,
    /// Fixed-depth minimax lookahead.
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimit {
    pub depth: u8,
    pub time_ms: Option<u64>, // milliseconds
    /// Stop after visiting this many nodes.
    pub nodes: Option<u32>,
}

impl SearchLimit {
    #[must_use]
    pub const fn depth(depth: u8) -> Self {
        Self {
            depth,
            time_ms: None,
            nodes: None,
        }
    }

    #[must_use]
    pub const fn depth_and_time(depth: u8, time_ms: u64) -> Self {
        Self {
            depth,
            time_ms: Some(time_ms),
            nodes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u32,
    pub time_ms: u64,
    /// The deadline or node budget cut the search short.
    pub timed_out: bool,
}

pub trait Evaluator {
    /// Static score of `state` from `perspective`'s point of view.
    /// `last_move` is the move that produced the position, if any.
    fn evaluate(&self, state: &GameState, perspective: Color, last_move: Option<&Move>) -> i32;
}

pub trait Searcher {
    fn search(&mut self, game_state: &GameState, limit: SearchLimit)
        -> Option<(Move, SearchStats)>;
}
