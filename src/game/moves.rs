//! Legal Move Generation
//!
//! Lazy iterator over the moves available to the side to move. Pieces are
//! visited column by column, top row first within a column, and each piece
//! tries the diagonal-left, straight and diagonal-right destinations in that
//! order.

use crate::game::board::{Board, Cell, Side, Square};
use crate::game::state::Turn;

/// Column offsets tried for every piece.
const COLUMN_OFFSETS: [isize; 3] = [-1, 0, 1];

/// Iterator returned by [`GameState::legal_moves`](crate::game::state::GameState::legal_moves).
#[derive(Clone, Debug)]
pub struct LegalMoves<'a> {
    board: &'a Board,
    side: Side,
    turn_id: u32,
    col: usize,
    row: usize,
    offset: usize,
}

impl<'a> LegalMoves<'a> {
    pub(crate) fn new(board: &'a Board, side: Side, turn_id: u32) -> Self {
        Self {
            board,
            side,
            turn_id,
            col: 0,
            row: 0,
            offset: 0,
        }
    }

    /// Move from the current square by `d_col`, if the rules allow it.
    fn candidate(&self, d_col: isize) -> Option<Turn> {
        let source = Square::new(self.row, self.col);
        let dest = source.offset(self.side.forward(), d_col)?;
        let target = self.board.get(dest)?;

        let legal = if d_col == 0 {
            target == Cell::Empty
        } else {
            !target.is(self.side)
        };

        legal.then(|| Turn::new(self.turn_id, source, dest, self.side))
    }

    fn advance_square(&mut self) {
        self.offset = 0;
        self.row += 1;
        if self.row >= self.board.rows() {
            self.row = 0;
            self.col += 1;
        }
    }
}

impl Iterator for LegalMoves<'_> {
    type Item = Turn;

    fn next(&mut self) -> Option<Turn> {
        while self.col < self.board.cols() {
            let here = self.board.get(Square::new(self.row, self.col));
            if here == Some(Cell::Piece(self.side)) {
                while self.offset < COLUMN_OFFSETS.len() {
                    let d_col = COLUMN_OFFSETS[self.offset];
                    self.offset += 1;
                    if let Some(turn) = self.candidate(d_col) {
                        return Some(turn);
                    }
                }
            }
            self.advance_square();
        }
        None
    }
}
