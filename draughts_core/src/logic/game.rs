use crate::engine::move_list::MoveList;
use crate::engine::{notation, Move};
use crate::error::{StateError, StateResult};
use crate::logic::board::{Board, Color, Piece, Square};
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::{validate_move, validate_snapshot, winner_if_stuck, MoveError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    InProgress,
    Over {
        winner: Color,
    },
}

/// By-value copy of everything needed to put a game back exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub turn: Color,
    pub scores: [u32; 2],
    pub status: GameStatus,
    pub move_count: u32,
    #[serde(default)]
    pub chain: Option<Square>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPiece {
    pub square: Square,
    pub piece: Piece,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub captured: Option<CapturedPiece>,
    pub promoted: bool,
    pub can_continue_capture: bool,
}

impl MoveResult {
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[must_use]
    pub fn notation(&self) -> String {
        notation(self.from, self.to, self.is_capture())
    }
}

/// Live game. Serialized as a [`GameSnapshot`]; deserializing runs the same
/// checks as [`GameState::set_board_state`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameSnapshot", into = "GameSnapshot")]
pub struct GameState {
    board: Board,
    turn: Color,
    status: GameStatus,
    scores: [u32; 2],
    move_count: u32,
    chain: Option<Square>,
}

impl TryFrom<GameSnapshot> for GameState {
    type Error = StateError;

    fn try_from(snapshot: GameSnapshot) -> Result<Self, Self::Error> {
        validate_snapshot(&snapshot)?;
        let mut state = Self::new();
        state.restore(&snapshot);
        Ok(state)
    }
}

impl From<GameState> for GameSnapshot {
    fn from(state: GameState) -> Self {
        state.get_board_state()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::with_first_turn(Color::White)
    }

    #[must_use]
    pub fn with_first_turn(turn: Color) -> Self {
        Self::with_board(Board::new(), turn)
    }

    /// Game starting from an arbitrary position with zero scores.
    #[must_use]
    pub const fn with_board(board: Board, turn: Color) -> Self {
        Self {
            board,
            turn,
            status: GameStatus::InProgress,
            scores: [0; 2],
            move_count: 0,
            chain: None,
        }
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn turn(&self) -> Color {
        self.turn
    }

    pub const fn status(&self) -> GameStatus {
        self.status
    }

    pub const fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::Over { .. })
    }

    pub const fn winner(&self) -> Option<Color> {
        match self.status {
            GameStatus::Over { winner } => Some(winner),
            GameStatus::InProgress => None,
        }
    }

    /// Pieces captured so far by `color`.
    pub const fn score(&self, color: Color) -> u32 {
        self.scores[color.index()]
    }

    pub const fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Square of the piece that must keep capturing, while a chain is pending.
    pub const fn chain(&self) -> Option<Square> {
        self.chain
    }

    pub const fn is_chain_pending(&self) -> bool {
        self.chain.is_some()
    }

    #[must_use]
    pub fn get_piece(&self, row: i32, col: i32) -> Option<Piece> {
        self.board.get(row, col)
    }

    /// Legal moves for the piece on `(row, col)`; empty for empty or off-board squares.
    #[must_use]
    pub fn legal_moves(&self, row: i32, col: i32) -> MoveList {
        Square::new(row, col).map_or_else(MoveList::new, |sq| self.moves_from(sq))
    }

    #[must_use]
    pub fn get_valid_moves(&self, row: i32, col: i32) -> MoveList {
        self.legal_moves(row, col)
    }

    #[must_use]
    pub fn moves_from(&self, from: Square) -> MoveList {
        MoveGenerator::new().legal_moves(&self.board, self.chain, from)
    }

    /// Every legal move of the side to move.
    #[must_use]
    pub fn all_moves(&self) -> MoveList {
        MoveGenerator::new().all_moves(&self.board, self.chain, self.turn)
    }

    #[must_use]
    pub fn any_capture_available(&self, color: Color) -> bool {
        MoveGenerator::new().any_capture_available(&self.board, color)
    }

    #[must_use]
    pub fn has_any_move(&self, color: Color) -> bool {
        MoveGenerator::new().has_any_move(&self.board, color)
    }

    #[must_use]
    pub fn get_all_pieces(&self, color: Color) -> Vec<(Square, Piece)> {
        self.board.pieces(color).collect()
    }

    /// Applies `from -> to` for the side to move, or explains why it cannot.
    /// On error nothing has changed.
    pub fn try_move(&mut self, from: Square, to: Square) -> Result<MoveResult, MoveError> {
        let mv = validate_move(self, from, to).map_err(|err| {
            debug!("rejected {}: {err:?}", notation(from, to, false));
            err
        })?;

        let mut piece = self.board.take(from).ok_or(MoveError::NoPieceAtSource)?;
        let captured = mv.captured.and_then(|square| {
            self.board
                .take(square)
                .map(|victim| CapturedPiece {
                    square,
                    piece: victim,
                })
        });
        self.board.put(to, Some(piece));
        self.move_count += 1;
        self.chain = None;

        let mut can_continue_capture = false;
        if captured.is_some() {
            self.scores[piece.color.index()] += 1;

            // Checked before crowning: a man reaching the far row stops there.
            let mut follow_up = MoveList::new();
            MoveGenerator::new().captures_for(&self.board, to, &mut follow_up);
            if !follow_up.is_empty() {
                can_continue_capture = true;
                self.chain = Some(to);
                debug!("{} must continue capturing from {to}", piece.color);
            }
        }

        let mut promoted = false;
        if !piece.is_king && to.row() == piece.color.promotion_row() {
            piece.is_king = true;
            self.board.put(to, Some(piece));
            promoted = true;
        }

        let next = if can_continue_capture {
            piece.color
        } else {
            piece.color.opposite()
        };
        if let Some(winner) = winner_if_stuck(&self.board, next) {
            self.status = GameStatus::Over { winner };
            info!("game over after move {}: {winner} wins", self.move_count);
        }

        Ok(MoveResult {
            color: piece.color,
            from,
            to,
            captured,
            promoted,
            can_continue_capture,
        })
    }

    /// Applies the move if it is legal; `None` means the request was rejected
    /// and the board is untouched.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Option<MoveResult> {
        self.try_move(from, to).ok()
    }

    /// Raw-coordinate entry point for callers holding untrusted positions.
    pub fn move_piece(
        &mut self,
        from_row: i32,
        from_col: i32,
        to_row: i32,
        to_col: i32,
    ) -> Option<MoveResult> {
        let (Some(from), Some(to)) = (Square::new(from_row, from_col), Square::new(to_row, to_col))
        else {
            debug!("rejected ({from_row},{from_col})->({to_row},{to_col}): {:?}", MoveError::OutOfBounds);
            return None;
        };
        self.apply_move(from, to)
    }

    pub fn play(&mut self, mv: &Move) -> Option<MoveResult> {
        self.apply_move(mv.from, mv.to)
    }

    /// Hands the move to the other side. Only call when the last result
    /// reported no pending capture. Does nothing once the game is over.
    pub fn switch_turn(&mut self) {
        if self.is_over() {
            return;
        }
        self.turn = self.turn.opposite();
        self.chain = None;
    }

    /// Gives the turn to `color` without touching the board, dropping any
    /// pending chain. Does nothing once the game is over.
    pub fn force_turn(&mut self, color: Color) {
        if self.is_over() {
            return;
        }
        if self.chain.is_some() {
            warn!("abandoning capture chain at {:?}", self.chain);
        }
        self.turn = color;
        self.chain = None;
    }

    /// Winner if the game is decided, checking the side to move first.
    #[must_use]
    pub fn check_win_condition(&self) -> Option<Color> {
        if let GameStatus::Over { winner } = self.status {
            return Some(winner);
        }
        if self.chain.is_some() {
            return None;
        }
        winner_if_stuck(&self.board, self.turn)
            .or_else(|| winner_if_stuck(&self.board, self.turn.opposite()))
    }

    #[must_use]
    pub const fn get_board_state(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            turn: self.turn,
            scores: self.scores,
            status: self.status,
            move_count: self.move_count,
            chain: self.chain,
        }
    }

    /// Replaces the live state after validating the snapshot; on error the
    /// current state is kept.
    pub fn set_board_state(&mut self, snapshot: &GameSnapshot) -> StateResult<()> {
        validate_snapshot(snapshot)?;
        self.restore(snapshot);
        Ok(())
    }

    /// Unchecked restore for snapshots this crate produced itself.
    pub(crate) fn restore(&mut self, snapshot: &GameSnapshot) {
        self.board = snapshot.board;
        self.turn = snapshot.turn;
        self.scores = snapshot.scores;
        self.status = snapshot.status;
        self.move_count = snapshot.move_count;
        self.chain = snapshot.chain;
    }

    pub fn snapshot_to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.get_board_state())
    }

    pub fn load_json(&mut self, json: &str) -> StateResult<()> {
        let snapshot: GameSnapshot = serde_json::from_str(json)?;
        self.set_board_state(&snapshot)
    }

    pub fn reset(&mut self) {
        self.reset_with_first(Color::White);
    }

    pub fn reset_with_first(&mut self, turn: Color) {
        *self = Self::with_first_turn(turn);
    }
}
