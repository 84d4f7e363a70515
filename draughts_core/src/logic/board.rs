use crate::error::StateError;
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;

pub const BOARD_SIZE: i32 = 8;
pub const PIECES_PER_SIDE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }

    /// Row step a man of this color takes when moving forward.
    pub const fn forward(self) -> i32 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Far edge row where a man of this color is crowned.
    pub const fn promotion_row(self) -> u8 {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub is_king: bool,
}

impl Piece {
    #[must_use]
    pub const fn man(color: Color) -> Self {
        Self {
            color,
            is_king: false,
        }
    }

    #[must_use]
    pub const fn king(color: Color) -> Self {
        Self {
            color,
            is_king: true,
        }
    }
}

/// A square on the 8x8 board. Only `Square::new` and checked deserialization
/// build one, so the coordinates are always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "SquareCoords")]
pub struct Square {
    row: u8,
    col: u8,
}

/// Wire shape of a square before bounds checking.
#[derive(Deserialize)]
struct SquareCoords {
    row: i32,
    col: i32,
}

impl TryFrom<SquareCoords> for Square {
    type Error = StateError;

    fn try_from(coords: SquareCoords) -> Result<Self, Self::Error> {
        Self::new(coords.row, coords.col).ok_or(StateError::OffBoard {
            row: coords.row,
            col: coords.col,
        })
    }
}

impl Square {
    #[must_use]
    pub fn new(row: i32, col: i32) -> Option<Self> {
        if Board::is_on_board(row, col) {
            Some(Self {
                row: u8::try_from(row).ok()?,
                col: u8::try_from(col).ok()?,
            })
        } else {
            None
        }
    }

    pub const fn row(self) -> u8 {
        self.row
    }

    pub const fn col(self) -> u8 {
        self.col
    }

    /// Square reached by stepping `(dr, dc)`, if still on the board.
    #[must_use]
    pub fn offset(self, dr: i32, dc: i32) -> Option<Self> {
        Self::new(i32::from(self.row) + dr, i32::from(self.col) + dc)
    }

    pub const fn index(self) -> usize {
        self.row as usize * 8 + self.col as usize
    }

    pub const fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    pub const fn is_edge_column(self) -> bool {
        self.col == 0 || self.col == 7
    }

    pub const fn manhattan(self, other: Self) -> u8 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Manhattan distance to the board centre (3.5, 3.5), doubled so it stays integral.
    pub const fn center_distance_x2(self) -> i32 {
        (2 * self.row as i32 - 7).abs() + (2 * self.col as i32 - 7).abs()
    }

    /// All 64 squares, row-major.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Self { row, col }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.col);
        write!(f, "{file}{}", self.row + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    #[serde(with = "BigArray")]
    cells: [Option<Piece>; 64],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard opening layout: White on rows 0-2, Black on rows 5-7, dark squares only.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        for sq in Square::all().filter(|sq| sq.is_dark()) {
            match sq.row {
                0..=2 => board.put(sq, Some(Piece::man(Color::White))),
                5..=7 => board.put(sq, Some(Piece::man(Color::Black))),
                _ => {}
            }
        }
        board
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self { cells: [None; 64] }
    }

    pub const fn is_on_board(row: i32, col: i32) -> bool {
        row >= 0 && row < BOARD_SIZE && col >= 0 && col < BOARD_SIZE
    }

    #[must_use]
    pub fn get(&self, row: i32, col: i32) -> Option<Piece> {
        Square::new(row, col).and_then(|sq| self.piece_at(sq))
    }

    /// Writes one cell. Out-of-range coordinates are ignored and report `false`.
    pub fn set(&mut self, row: i32, col: i32, piece: Option<Piece>) -> bool {
        match Square::new(row, col) {
            Some(sq) => {
                self.put(sq, piece);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells.get(sq.index()).copied().flatten()
    }

    pub fn put(&mut self, sq: Square, piece: Option<Piece>) {
        if let Some(cell) = self.cells.get_mut(sq.index()) {
            *cell = piece;
        }
    }

    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.cells.get_mut(sq.index()).and_then(Option::take)
    }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| {
            self.piece_at(sq)
                .filter(|p| p.color == color)
                .map(|p| (sq, p))
        })
    }

    #[must_use]
    pub fn count(&self, color: Color) -> usize {
        self.pieces(color).count()
    }

    /// Text diagram, row 7 on top. `w`/`b` men, `W`/`B` kings.
    #[must_use]
    pub fn to_diagram(&self) -> String {
        let mut out = String::with_capacity(8 * 11);
        for row in (0..8u8).rev() {
            out.push(char::from(b'1' + row));
            out.push(' ');
            for col in 0..8u8 {
                let sq = Square { row, col };
                let ch = match self.piece_at(sq) {
                    Some(Piece {
                        color: Color::White,
                        is_king,
                    }) => {
                        if is_king {
                            'W'
                        } else {
                            'w'
                        }
                    }
                    Some(Piece {
                        color: Color::Black,
                        is_king,
                    }) => {
                        if is_king {
                            'B'
                        } else {
                            'b'
                        }
                    }
                    None => '.',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out.push_str("  abcdefgh\n");
        out
    }
}
