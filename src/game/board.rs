//! Board Model
//!
//! A rows × cols grid of cells. Dimensions are fixed at creation.

use serde::{Deserialize, Serialize};

/// Largest supported row or column count.
pub const MAX_BOARD_DIMENSION: usize = 64;

// =============================================================================
// SIDE
// =============================================================================

/// One of the two sides of a game.
///
/// Side A starts on row 0 and moves towards higher rows; side B starts on the
/// last row and moves towards row 0. On the wire a side is its player number
/// (1 or 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Side {
    /// Player 1, home row 0.
    A,
    /// Player 2, home row `rows - 1`.
    B,
}

impl Side {
    /// Wire code of this side.
    pub const fn code(self) -> u8 {
        match self {
            Side::A => 1,
            Side::B => 2,
        }
    }

    /// Side for a wire code.
    pub const fn from_code(code: u8) -> Option<Side> {
        match code {
            1 => Some(Side::A),
            2 => Some(Side::B),
            _ => None,
        }
    }

    /// The other side.
    pub const fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Row step towards the opponent's back rank.
    pub const fn forward(self) -> isize {
        match self {
            Side::A => 1,
            Side::B => -1,
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> u8 {
        side.code()
    }
}

impl TryFrom<u8> for Side {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Side::from_code(code).ok_or_else(|| format!("invalid player number {code}"))
    }
}

// =============================================================================
// CELL
// =============================================================================

/// Contents of one board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// No piece.
    #[default]
    Empty,
    /// A piece of the given side.
    Piece(Side),
}

impl Cell {
    /// Wire code: 0 empty, otherwise the side's code.
    pub const fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Piece(side) => side.code(),
        }
    }

    /// Whether this cell holds a piece of `side`.
    #[inline]
    pub fn is(self, side: Side) -> bool {
        self == Cell::Piece(side)
    }
}

// =============================================================================
// SQUARE
// =============================================================================

/// A board coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    /// Row index, 0 is side A's home row.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl Square {
    /// Create a square.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offset by a signed delta; `None` when it would go negative.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Square> {
        Some(Square {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// Row-major grid of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// An all-empty board. Callers validate dimensions.
    pub(crate) fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Index of the last row (side B's home row).
    #[inline]
    pub fn last_row(&self) -> usize {
        self.rows - 1
    }

    /// Whether a square lies on the grid.
    #[inline]
    pub fn contains(&self, square: Square) -> bool {
        square.row < self.rows && square.col < self.cols
    }

    /// Cell at a square, `None` when off the grid.
    #[inline]
    pub fn get(&self, square: Square) -> Option<Cell> {
        self.contains(square)
            .then(|| self.cells[square.row * self.cols + square.col])
    }

    /// Overwrite a cell. Off-grid writes are ignored.
    pub(crate) fn set(&mut self, square: Square, cell: Cell) {
        if self.contains(square) {
            self.cells[square.row * self.cols + square.col] = cell;
        }
    }

    /// Fill a whole row with pieces of `side`.
    pub(crate) fn fill_row(&mut self, row: usize, side: Side) {
        for col in 0..self.cols {
            self.set(Square::new(row, col), Cell::Piece(side));
        }
    }

    /// Rows of wire codes, as served to clients.
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }

    /// Raw cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
