//! Game Logic Module
//!
//! Pure rule engine and rating arithmetic. No I/O, no locking.
//!
//! ## Module Structure
//!
//! - `board`: Grid, sides, cells and coordinates
//! - `moves`: Lazy legal-move generation
//! - `state`: Turns, outcomes, rule application and terminal detection
//! - `rating`: Elo update for finished games

pub mod board;
pub mod moves;
pub mod state;
pub mod rating;

// Re-export key types
pub use board::{Board, Cell, Side, Square, MAX_BOARD_DIMENSION};
pub use moves::LegalMoves;
pub use state::{GameState, Outcome, RuleError, Turn};
pub use rating::{update_ratings, INITIAL_RATING};
