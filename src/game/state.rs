//! Game State and Rules
//!
//! [`GameState`] is the pure rule engine: initial layout, turn application,
//! and terminal-state detection. The side to move is never stored; it is
//! derived from the parity of the recorded history.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hash::{StateHash, StateHasher};
use crate::game::board::{Board, Cell, Side, Square, MAX_BOARD_DIMENSION};
use crate::game::moves::LegalMoves;

// =============================================================================
// TURN
// =============================================================================

/// One move: a piece of `side` travels from `source` to `dest`.
///
/// `turn_id` is the move's position in the game history. It is not part of
/// move identity: two turns are the same move when source, destination and
/// side agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "TurnWire", from = "TurnWire")]
pub struct Turn {
    /// Sequence number within the game.
    pub turn_id: u32,
    /// Square the piece leaves.
    pub source: Square,
    /// Square the piece lands on.
    pub dest: Square,
    /// Acting side.
    pub side: Side,
}

impl Turn {
    /// Create a turn.
    pub const fn new(turn_id: u32, source: Square, dest: Square, side: Side) -> Self {
        Self {
            turn_id,
            source,
            dest,
            side,
        }
    }

    /// Exact move identity, ignoring the sequence number.
    #[inline]
    pub fn same_move(&self, other: &Turn) -> bool {
        self.source == other.source && self.dest == other.dest && self.side == other.side
    }
}

/// JSON shape of a turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnWire {
    #[serde(rename = "turnID", default)]
    turn_id: u32,
    dest_row: usize,
    dest_col: usize,
    source_row: usize,
    source_col: usize,
    player: Side,
}

impl From<Turn> for TurnWire {
    fn from(t: Turn) -> Self {
        Self {
            turn_id: t.turn_id,
            dest_row: t.dest.row,
            dest_col: t.dest.col,
            source_row: t.source.row,
            source_col: t.source.col,
            player: t.side,
        }
    }
}

impl From<TurnWire> for Turn {
    fn from(w: TurnWire) -> Self {
        Turn::new(
            w.turn_id,
            Square::new(w.source_row, w.source_col),
            Square::new(w.dest_row, w.dest_col),
            w.player,
        )
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Classification of a game. Wire codes: 0 ongoing, -1 draw, 1 A wins, 2 B wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Outcome {
    /// Still being played.
    #[default]
    Ongoing,
    /// Side to move had no legal moves.
    Draw,
    /// Side A reached the last row.
    AWins,
    /// Side B reached row 0.
    BWins,
}

impl Outcome {
    /// Wire code.
    pub const fn code(self) -> i8 {
        match self {
            Outcome::Ongoing => 0,
            Outcome::Draw => -1,
            Outcome::AWins => 1,
            Outcome::BWins => 2,
        }
    }

    /// Outcome for a wire code.
    pub const fn from_code(code: i8) -> Option<Outcome> {
        match code {
            0 => Some(Outcome::Ongoing),
            -1 => Some(Outcome::Draw),
            1 => Some(Outcome::AWins),
            2 => Some(Outcome::BWins),
            _ => None,
        }
    }

    /// A side won by reaching the far row.
    pub const fn won_by(side: Side) -> Outcome {
        match side {
            Side::A => Outcome::AWins,
            Side::B => Outcome::BWins,
        }
    }

    /// Whether the game is over.
    #[inline]
    pub fn is_finished(self) -> bool {
        self != Outcome::Ongoing
    }

    /// The winning side, if any.
    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::AWins => Some(Side::A),
            Outcome::BWins => Some(Side::B),
            Outcome::Ongoing | Outcome::Draw => None,
        }
    }
}

impl From<Outcome> for i8 {
    fn from(outcome: Outcome) -> i8 {
        outcome.code()
    }
}

impl TryFrom<i8> for Outcome {
    type Error = String;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        Outcome::from_code(code).ok_or_else(|| format!("invalid outcome code {code}"))
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Board dimensions outside 1..=MAX_BOARD_DIMENSION.
    #[error("invalid board dimensions {rows}x{cols}")]
    InvalidDimensions {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// Turn is not in the legal-move set of the current position.
    #[error("illegal move {from:?} -> {to:?} for player {side:?}")]
    IllegalMove {
        /// Source square.
        from: Square,
        /// Destination square.
        to: Square,
        /// Declared side.
        side: Side,
    },
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Board plus the ordered history that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    history: Vec<Turn>,
}

impl GameState {
    /// Initial position: side A fills row 0, side B fills the last row.
    ///
    /// On a one-row board side B's pieces overwrite side A's.
    pub fn new(rows: usize, cols: usize) -> Result<Self, RuleError> {
        let valid = 1..=MAX_BOARD_DIMENSION;
        if !valid.contains(&rows) || !valid.contains(&cols) {
            return Err(RuleError::InvalidDimensions { rows, cols });
        }

        let mut board = Board::empty(rows, cols);
        board.fill_row(0, Side::A);
        board.fill_row(rows - 1, Side::B);

        Ok(Self {
            board,
            history: Vec::new(),
        })
    }

    /// Rebuild a state by replaying recorded turns from the initial position.
    pub fn replay<'t>(
        rows: usize,
        cols: usize,
        turns: impl IntoIterator<Item = &'t Turn>,
    ) -> Result<Self, RuleError> {
        let mut state = Self::new(rows, cols)?;
        for turn in turns {
            state.apply(*turn)?;
        }
        Ok(state)
    }

    /// The board.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.board.rows()
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.board.cols()
    }

    /// Recorded turns, oldest first.
    #[inline]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Sequence id the next recorded turn will get.
    #[inline]
    pub fn next_turn_id(&self) -> u32 {
        self.history.len() as u32
    }

    /// Side A after an even number of turns, side B after an odd number.
    #[inline]
    pub fn side_to_move(&self) -> Side {
        if self.history.len() % 2 == 0 {
            Side::A
        } else {
            Side::B
        }
    }

    /// Legal moves for the side to move, generated lazily.
    pub fn legal_moves(&self) -> LegalMoves<'_> {
        LegalMoves::new(&self.board, self.side_to_move(), self.next_turn_id())
    }

    /// Whether `turn` is a legal move right now.
    pub fn is_legal(&self, turn: &Turn) -> bool {
        turn.side == self.side_to_move() && self.legal_moves().any(|m| m.same_move(turn))
    }

    /// Apply a turn and record it.
    ///
    /// The stored copy gets the next sequence id regardless of the id the
    /// caller supplied.
    pub fn apply(&mut self, turn: Turn) -> Result<&Turn, RuleError> {
        if !self.is_legal(&turn) {
            return Err(RuleError::IllegalMove {
                from: turn.source,
                to: turn.dest,
                side: turn.side,
            });
        }

        let recorded = Turn {
            turn_id: self.next_turn_id(),
            ..turn
        };
        self.board.set(recorded.dest, Cell::Piece(recorded.side));
        self.board.set(recorded.source, Cell::Empty);
        self.history.push(recorded);

        Ok(&self.history[self.history.len() - 1])
    }

    /// Current classification of the position.
    ///
    /// Reaching the far row is checked column by column (side B on row 0
    /// first, then side A on the last row) and takes priority over the
    /// no-moves draw.
    pub fn winner(&self) -> Outcome {
        let last = self.board.last_row();
        for col in 0..self.board.cols() {
            if self.board.get(Square::new(0, col)) == Some(Cell::Piece(Side::B)) {
                return Outcome::BWins;
            }
            if self.board.get(Square::new(last, col)) == Some(Cell::Piece(Side::A)) {
                return Outcome::AWins;
            }
        }

        if self.legal_moves().next().is_none() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }

    /// Whether the game is over.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.winner().is_finished()
    }

    /// Domain-separated hash of dimensions, cells and history.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_game_state();
        hasher.update_usize(self.rows());
        hasher.update_usize(self.cols());
        for cell in self.board.cells() {
            hasher.update_u8(cell.code());
        }
        hasher.update_usize(self.history.len());
        for turn in &self.history {
            hasher.update_u32(turn.turn_id);
            hasher.update_usize(turn.source.row);
            hasher.update_usize(turn.source.col);
            hasher.update_usize(turn.dest.row);
            hasher.update_usize(turn.dest.col);
            hasher.update_u8(turn.side.code());
        }
        hasher.finalize()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{DeterministicRng, RandomSource};
    use proptest::prelude::*;

    fn clear(state: &mut GameState) {
        for row in 0..state.rows() {
            for col in 0..state.cols() {
                state.board_mut().set(Square::new(row, col), Cell::Empty);
            }
        }
    }

    /// Play random legal moves until the game ends or `max_turns` is hit.
    fn random_playout(rows: usize, cols: usize, seed: u64, max_turns: usize) -> GameState {
        let mut rng = DeterministicRng::new(seed);
        let mut state = GameState::new(rows, cols).unwrap();
        for _ in 0..max_turns {
            if state.is_terminal() {
                break;
            }
            let moves: Vec<Turn> = state.legal_moves().collect();
            let pick = moves[rng.next_below(moves.len() as u64) as usize];
            state.apply(pick).unwrap();
        }
        state
    }

    #[test]
    fn test_initial_state_3x3() {
        let state = GameState::new(3, 3).unwrap();
        assert_eq!(state.board().to_codes(), vec![vec![1, 1, 1], vec![0, 0, 0], vec![2, 2, 2]]);
        assert_eq!(state.side_to_move(), Side::A);
        assert!(state.history().is_empty());
        assert_eq!(state.winner(), Outcome::Ongoing);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(GameState::new(0, 3), Err(RuleError::InvalidDimensions { .. })));
        assert!(matches!(GameState::new(3, 0), Err(RuleError::InvalidDimensions { .. })));
        assert!(GameState::new(MAX_BOARD_DIMENSION + 1, 3).is_err());
        assert!(GameState::new(1, 1).is_ok());
    }

    #[test]
    fn test_single_row_board_is_won_by_b() {
        let state = GameState::new(1, 3).unwrap();
        assert_eq!(state.board().to_codes(), vec![vec![2, 2, 2]]);
        assert_eq!(state.winner(), Outcome::BWins);
    }

    #[test]
    fn test_apply_moves_piece_and_records_turn() {
        let mut state = GameState::new(3, 3).unwrap();
        let turn = Turn::new(99, Square::new(0, 1), Square::new(1, 1), Side::A);

        let recorded = *state.apply(turn).unwrap();
        assert_eq!(recorded.turn_id, 0);
        assert_eq!(state.board().get(Square::new(0, 1)), Some(Cell::Empty));
        assert_eq!(state.board().get(Square::new(1, 1)), Some(Cell::Piece(Side::A)));
        assert_eq!(state.side_to_move(), Side::B);
    }

    #[test]
    fn test_apply_rejects_wrong_side() {
        let mut state = GameState::new(3, 3).unwrap();
        // Geometrically fine for B, but it is A's move.
        let turn = Turn::new(0, Square::new(2, 1), Square::new(1, 1), Side::B);
        assert!(matches!(state.apply(turn), Err(RuleError::IllegalMove { .. })));
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_apply_rejects_non_member() {
        let mut state = GameState::new(4, 4).unwrap();
        let jump = Turn::new(0, Square::new(0, 0), Square::new(2, 0), Side::A);
        let sideways = Turn::new(0, Square::new(0, 0), Square::new(0, 1), Side::A);
        assert!(state.apply(jump).is_err());
        assert!(state.apply(sideways).is_err());
        assert_eq!(state, GameState::new(4, 4).unwrap());
    }

    #[test]
    fn test_diagonal_into_empty_is_legal() {
        let mut state = GameState::new(3, 3).unwrap();
        let diagonal = Turn::new(0, Square::new(0, 0), Square::new(1, 1), Side::A);
        assert!(state.apply(diagonal).is_ok());
    }

    #[test]
    fn test_b_on_row_zero_beats_a_on_last_row() {
        let mut state = GameState::new(3, 3).unwrap();
        clear(&mut state);
        state.board_mut().set(Square::new(0, 2), Cell::Piece(Side::B));
        state.board_mut().set(Square::new(2, 2), Cell::Piece(Side::A));
        state.board_mut().set(Square::new(1, 0), Cell::Piece(Side::A));

        assert_eq!(state.winner(), Outcome::BWins);
    }

    #[test]
    fn test_row_win_takes_priority_over_stalemate() {
        let mut state = GameState::new(3, 3).unwrap();
        clear(&mut state);
        // A to move, but A has no pieces at all; B already stands on row 0.
        state.board_mut().set(Square::new(0, 1), Cell::Piece(Side::B));

        assert!(state.legal_moves().next().is_none());
        assert_eq!(state.winner(), Outcome::BWins);
    }

    #[test]
    fn test_no_legal_moves_is_draw() {
        let mut state = GameState::new(4, 1).unwrap();
        // Column of one: A at row 1 blocked by B at row 2.
        clear(&mut state);
        state.board_mut().set(Square::new(1, 0), Cell::Piece(Side::A));
        state.board_mut().set(Square::new(2, 0), Cell::Piece(Side::B));

        assert_eq!(state.winner(), Outcome::Draw);
        assert_eq!(state.winner().code(), -1);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_a_reaching_last_row_wins() {
        let mut state = GameState::new(2, 2).unwrap();
        let capture = Turn::new(0, Square::new(0, 0), Square::new(1, 1), Side::A);
        state.apply(capture).unwrap();
        assert_eq!(state.winner(), Outcome::AWins);
    }

    #[test]
    fn test_outcome_codes_roundtrip_json() {
        for outcome in [Outcome::Ongoing, Outcome::Draw, Outcome::AWins, Outcome::BWins] {
            let json = serde_json::to_string(&outcome).unwrap();
            assert_eq!(json, outcome.code().to_string());
        }
        assert!(serde_json::from_str::<Outcome>("3").is_err());
    }

    #[test]
    fn test_turn_wire_field_names() {
        let turn = Turn::new(4, Square::new(1, 2), Square::new(2, 3), Side::B);
        let value = serde_json::to_value(turn).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "turnID": 4, "destRow": 2, "destCol": 3,
                "sourceRow": 1, "sourceCol": 2, "player": 2
            })
        );

        // Clients may omit the sequence id.
        let parsed: Turn = serde_json::from_str(
            r#"{"destRow":1,"destCol":0,"sourceRow":0,"sourceCol":0,"player":1}"#,
        )
        .unwrap();
        assert_eq!(parsed.turn_id, 0);
        assert_eq!(parsed.dest, Square::new(1, 0));
    }

    #[test]
    fn test_replay_reproduces_board_and_hash() {
        let played = random_playout(8, 8, 2024, 200);
        let rebuilt = GameState::replay(8, 8, played.history()).unwrap();

        assert_eq!(rebuilt.board(), played.board());
        assert_eq!(rebuilt.compute_hash(), played.compute_hash());
    }

    #[test]
    fn test_replay_rejects_tampered_history() {
        let played = random_playout(5, 3, 7, 4);
        let mut turns = played.history().to_vec();
        turns[0].side = Side::B;
        assert!(GameState::replay(5, 3, &turns).is_err());
    }

    proptest! {
        #[test]
        fn prop_legal_moves_are_sound(
            rows in 2usize..9,
            cols in 1usize..9,
            seed in any::<u64>(),
            turns in 0usize..40,
        ) {
            let state = random_playout(rows, cols, seed, turns);
            let mover = state.side_to_move();

            for m in state.legal_moves() {
                prop_assert_eq!(m.side, mover);
                prop_assert_eq!(state.board().get(m.source), Some(Cell::Piece(mover)));
                prop_assert!(state.board().contains(m.dest));

                let mut next = state.clone();
                next.apply(m).unwrap();
                prop_assert_eq!(next.board().get(m.source), Some(Cell::Empty));
                prop_assert_eq!(next.board().get(m.dest), Some(Cell::Piece(mover)));
                prop_assert_eq!(next.history().len(), state.history().len() + 1);
            }
        }

        #[test]
        fn prop_replay_is_deterministic(
            rows in 2usize..10,
            cols in 1usize..10,
            seed in any::<u64>(),
        ) {
            let played = random_playout(rows, cols, seed, 300);
            let rebuilt = GameState::replay(rows, cols, played.history()).unwrap();
            prop_assert_eq!(rebuilt, played);
        }
    }
}
