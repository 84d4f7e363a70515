use crate::engine::move_list::MoveList;
use crate::engine::Move;
use crate::logic::board::{Board, Color, Piece, Square};

const KING_DIRECTIONS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const WHITE_MAN_DIRECTIONS: [(i32, i32); 2] = [(1, -1), (1, 1)];
const BLACK_MAN_DIRECTIONS: [(i32, i32); 2] = [(-1, -1), (-1, 1)];

/// Stateless move generation over a board plus an optional pending capture chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    const fn directions(piece: Piece) -> &'static [(i32, i32)] {
        if piece.is_king {
            &KING_DIRECTIONS
        } else {
            match piece.color {
                Color::White => &WHITE_MAN_DIRECTIONS,
                Color::Black => &BLACK_MAN_DIRECTIONS,
            }
        }
    }

    /// Jumps available to the piece on `from`, in direction order.
    pub fn captures_for(&self, board: &Board, from: Square, out: &mut MoveList) {
        let Some(piece) = board.piece_at(from) else {
            return;
        };
        for &(dr, dc) in Self::directions(piece) {
            let (Some(over), Some(land)) = (from.offset(dr, dc), from.offset(2 * dr, 2 * dc))
            else {
                continue;
            };
            let jumps_opponent = board
                .piece_at(over)
                .is_some_and(|victim| victim.color != piece.color);
            if jumps_opponent && board.piece_at(land).is_none() {
                out.push(Move::capture(from, over, land));
            }
        }
    }

    /// Single-step diagonal moves to empty squares, in direction order.
    pub fn quiet_moves_for(&self, board: &Board, from: Square, out: &mut MoveList) {
        let Some(piece) = board.piece_at(from) else {
            return;
        };
        for &(dr, dc) in Self::directions(piece) {
            if let Some(to) = from.offset(dr, dc) {
                if board.piece_at(to).is_none() {
                    out.push(Move::quiet(from, to));
                }
            }
        }
    }

    /// Moves for one piece at the start of a turn: its captures if it has any,
    /// otherwise its quiet moves.
    pub fn piece_moves(&self, board: &Board, from: Square) -> MoveList {
        let mut moves = MoveList::new();
        self.captures_for(board, from, &mut moves);
        if moves.is_empty() {
            self.quiet_moves_for(board, from, &mut moves);
        }
        moves
    }

    /// Legal moves for the piece on `from`. While a chain is pending only the
    /// chain piece may move, and only by capturing.
    pub fn legal_moves(&self, board: &Board, chain: Option<Square>, from: Square) -> MoveList {
        match chain {
            Some(chain_sq) if chain_sq == from => {
                let mut moves = MoveList::new();
                self.captures_for(board, from, &mut moves);
                moves
            }
            Some(_) => MoveList::new(),
            None => self.piece_moves(board, from),
        }
    }

    /// Union of `legal_moves` over every piece of `color`, row-major.
    pub fn all_moves(&self, board: &Board, chain: Option<Square>, color: Color) -> MoveList {
        let mut moves = MoveList::new();
        for (sq, _) in board.pieces(color) {
            moves.extend(self.legal_moves(board, chain, sq));
        }
        moves
    }

    /// Whether `color` could move at all on a fresh turn.
    pub fn has_any_move(&self, board: &Board, color: Color) -> bool {
        board
            .pieces(color)
            .any(|(sq, _)| !self.piece_moves(board, sq).is_empty())
    }

    pub fn any_capture_available(&self, board: &Board, color: Color) -> bool {
        let mut scratch = MoveList::new();
        board.pieces(color).any(|(sq, _)| {
            scratch.clear();
            self.captures_for(board, sq, &mut scratch);
            !scratch.is_empty()
        })
    }

    /// Whether the piece standing on `target` can be jumped by an opponent right now.
    pub fn is_attacked(&self, board: &Board, target: Square) -> bool {
        let Some(piece) = board.piece_at(target) else {
            return false;
        };
        let mut scratch = MoveList::new();
        board.pieces(piece.color.opposite()).any(|(sq, _)| {
            scratch.clear();
            self.captures_for(board, sq, &mut scratch);
            scratch.iter().any(|mv| mv.captured == Some(target))
        })
    }
}
