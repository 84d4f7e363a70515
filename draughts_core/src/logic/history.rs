//! Append-only move log with per-move snapshots, replay and transcript export.

use crate::logic::board::{Color, Square};
use crate::logic::game::{GameSnapshot, GameState, GameStatus, MoveResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::ops::ControlFlow;
use web_time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub number: usize,
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub is_capture: bool,
    pub captured: Option<Square>,
    pub promoted: bool,
    pub notation: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplayState {
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReplayCursor {
    next: usize,
    state: ReplayState,
}

#[derive(Debug, Clone, Default)]
pub struct GameHistory {
    moves: Vec<MoveRecord>,
    // states[0] is the position before the first move, states[i] after move i.
    states: Vec<GameSnapshot>,
    current: Option<usize>,
    replay: Option<ReplayCursor>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Transcript<'a> {
    game: TranscriptSummary,
    moves: Vec<TranscriptMove<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptSummary {
    winner: Option<Color>,
    total_moves: usize,
    final_score: FinalScore,
}

#[derive(Serialize)]
struct FinalScore {
    white: u32,
    black: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptMove<'a> {
    number: usize,
    color: Color,
    notation: &'a str,
    from: Square,
    to: Square,
    is_capture: bool,
    is_king: bool,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

impl GameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the record for `result`. `before` is the position the move was
    /// played from; `after` is the game once the move is applied and the turn
    /// has been handed on, so every stored snapshot is playable.
    pub fn record(
        &mut self,
        result: &MoveResult,
        before: GameSnapshot,
        after: &GameState,
    ) -> &MoveRecord {
        self.halt_replay();

        if self.states.len() == self.moves.len() {
            self.states.push(before);
        }

        let number = self.moves.len() + 1;
        self.moves.push(MoveRecord {
            number,
            color: result.color,
            from: result.from,
            to: result.to,
            is_capture: result.is_capture(),
            captured: result.captured.map(|c| c.square),
            promoted: result.promoted,
            notation: result.notation(),
            timestamp_ms: now_ms(),
        });
        self.states.push(after.get_board_state());
        self.current = Some(self.states.len() - 1);

        &self.moves[number - 1]
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn get_move(&self, index: usize) -> Option<&MoveRecord> {
        self.moves.get(index)
    }

    pub fn states(&self) -> &[GameSnapshot] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub const fn current_state_index(&self) -> Option<usize> {
        self.current
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.states.clear();
        self.current = None;
        self.replay = None;
    }

    /// Puts `game` into the position stored at `index`.
    pub fn jump_to_state(&mut self, index: usize, game: &mut GameState) -> bool {
        let Some(snapshot) = self.states.get(index) else {
            return false;
        };
        game.restore(snapshot);
        self.current = Some(index);
        true
    }

    /// Position right after move `move_index` (zero-based).
    pub fn jump_to_move(&mut self, move_index: usize, game: &mut GameState) -> bool {
        self.jump_to_state(move_index + 1, game)
    }

    /// Move that produced the currently shown position.
    pub fn current_move(&self) -> Option<&MoveRecord> {
        match self.current {
            Some(index) if index > 0 => self.moves.get(index - 1),
            _ => None,
        }
    }

    /// Walks the stored positions from `from`, handing each to `on_step`.
    /// Returns the index to resume from when the callback breaks, or `None`
    /// once the end has been reached.
    pub fn replay<F>(&self, from: usize, mut on_step: F) -> Option<usize>
    where
        F: FnMut(usize, &GameSnapshot) -> ControlFlow<()>,
    {
        for (index, snapshot) in self.states.iter().enumerate().skip(from) {
            if on_step(index, snapshot).is_break() {
                return Some(index + 1).filter(|&next| next < self.states.len());
            }
        }
        None
    }

    /// Starts (or restarts) stepwise playback from the initial position.
    pub fn start_replay(&mut self, game: &mut GameState) -> bool {
        self.start_replay_at(0, game)
    }

    pub fn start_replay_at(&mut self, index: usize, game: &mut GameState) -> bool {
        if self.moves.is_empty() || !self.jump_to_state(index, game) {
            return false;
        }
        self.replay = Some(ReplayCursor {
            next: index + 1,
            state: ReplayState::Playing,
        });
        true
    }

    /// Advances playback by one position; meant to be driven by a timer.
    /// Returns the index shown, or `None` when paused, idle or finished.
    pub fn step_replay(&mut self, game: &mut GameState) -> Option<usize> {
        let cursor = self.replay?;
        if cursor.state == ReplayState::Paused {
            return None;
        }
        if cursor.next >= self.states.len() {
            self.stop_replay(game);
            return None;
        }
        self.jump_to_state(cursor.next, game);
        self.replay = Some(ReplayCursor {
            next: cursor.next + 1,
            ..cursor
        });
        Some(cursor.next)
    }

    pub fn pause_replay(&mut self) {
        if let Some(cursor) = self.replay.as_mut() {
            cursor.state = ReplayState::Paused;
        }
    }

    pub fn resume_replay(&mut self) {
        if let Some(cursor) = self.replay.as_mut() {
            cursor.state = ReplayState::Playing;
        }
    }

    /// Ends playback and shows the final position again.
    pub fn stop_replay(&mut self, game: &mut GameState) {
        self.replay = None;
        if let Some(last) = self.states.len().checked_sub(1) {
            self.jump_to_state(last, game);
        }
    }

    pub fn is_replaying(&self) -> bool {
        self.replay.is_some()
    }

    fn halt_replay(&mut self) {
        if self.replay.take().is_some() {
            debug!("replay halted by a new move");
        }
    }

    fn final_state(&self) -> Option<&GameSnapshot> {
        self.states.last()
    }

    pub fn export_as_text(&self) -> String {
        if self.moves.is_empty() {
            return "No moves recorded.".to_string();
        }

        let mut text = String::from("DRAUGHTS/CHECKERS GAME\n======================\n\n");
        if let Some(state) = self.final_state() {
            if let GameStatus::Over { winner } = state.status {
                let _ = writeln!(text, "Winner: {winner}");
            }
            let _ = writeln!(text, "Total Moves: {}", self.moves.len());
            let _ = writeln!(
                text,
                "Final Score - White: {} | Black: {}\n",
                state.scores[Color::White.index()],
                state.scores[Color::Black.index()]
            );
        }

        text.push_str("MOVE HISTORY\n------------\n");
        for record in &self.moves {
            let king = if record.promoted { " (KING!)" } else { "" };
            let _ = writeln!(
                text,
                "{}. {}: {}{king}",
                record.number, record.color, record.notation
            );
        }
        text
    }

    pub fn export_as_json(&self) -> Result<String, serde_json::Error> {
        let (winner, scores) = self.final_state().map_or((None, [0, 0]), |state| {
            let winner = match state.status {
                GameStatus::Over { winner } => Some(winner),
                GameStatus::InProgress => None,
            };
            (winner, state.scores)
        });

        let transcript = Transcript {
            game: TranscriptSummary {
                winner,
                total_moves: self.moves.len(),
                final_score: FinalScore {
                    white: scores[Color::White.index()],
                    black: scores[Color::Black.index()],
                },
            },
            moves: self
                .moves
                .iter()
                .map(|record| TranscriptMove {
                    number: record.number,
                    color: record.color,
                    notation: &record.notation,
                    from: record.from,
                    to: record.to,
                    is_capture: record.is_capture,
                    is_king: record.promoted,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&transcript)
    }
}
