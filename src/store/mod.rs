//! Persistence Gateway
//!
//! The registry talks to durable storage only through [`GameStore`]. Every
//! method is a single all-or-nothing operation: when it returns an error,
//! nothing it was asked to write is visible afterwards.
//!
//! ## Implementations
//!
//! - [`MemoryStore`]: process-local tables, used by tests and ephemeral runs
//! - [`JsonFileStore`]: the same tables persisted as a JSON snapshot file

pub mod memory;
pub mod file;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arena::game::GameId;
use crate::arena::player::{HistoryEntry, Player, PlayerId};
use crate::game::state::{Outcome, Turn};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

// =============================================================================
// RECORDS
// =============================================================================

/// Durable form of a game: who plays which side, and the turns so far.
///
/// The board is never stored; it is rebuilt by replaying `turns`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Game identifier.
    pub id: GameId,
    /// Player on side A.
    pub side_a: PlayerId,
    /// Player on side B.
    pub side_b: PlayerId,
    /// Board rows.
    pub rows: usize,
    /// Board columns.
    pub cols: usize,
    /// Current outcome.
    pub outcome: Outcome,
    /// Recorded turns, oldest first.
    pub turns: Vec<Turn>,
}

impl GameRecord {
    /// Whether `player` plays in this game.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.side_a == player || self.side_b == player
    }
}

/// New rating and history line for one player of a finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    /// Player being updated.
    pub player: PlayerId,
    /// Rating after the game.
    pub rating: i32,
    /// History line to append.
    pub entry: HistoryEntry,
}

/// One turn to persist, with the game's outcome after it.
///
/// A finishing turn carries one [`RatingRecord`] per player so that the turn,
/// the outcome, the ratings and the histories land together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnCommit {
    /// Game the turn belongs to.
    pub game_id: GameId,
    /// The turn, with its final sequence id.
    pub turn: Turn,
    /// Outcome after the turn.
    pub outcome: Outcome,
    /// Rating updates; empty unless the turn finished the game.
    pub ratings: Vec<RatingRecord>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A player with this name already exists.
    #[error("player name already taken: {0}")]
    DuplicateName(String),

    /// Unknown game.
    #[error("game {0} not found")]
    GameNotFound(GameId),

    /// Unknown player.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// Write rejected because it does not follow the stored state.
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// Snapshot file I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// =============================================================================
// GATEWAY TRAIT
// =============================================================================

/// Durable storage for games and players.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Insert a new ongoing game with no turns.
    async fn create_game(
        &self,
        side_a: PlayerId,
        side_b: PlayerId,
        rows: usize,
        cols: usize,
    ) -> Result<GameId, StoreError>;

    /// Load a game.
    async fn load_game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError>;

    /// Append a turn, set the outcome and apply any rating updates.
    ///
    /// Fails with [`StoreError::Conflict`] when the turn's sequence id is not
    /// the next one or the game is already finished.
    async fn append_turn(&self, commit: TurnCommit) -> Result<(), StoreError>;

    /// Load a player.
    async fn load_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError>;

    /// Find the player owning a credential digest.
    async fn find_player_by_credential(&self, digest: &str) -> Result<Option<Player>, StoreError>;

    /// Insert a new player with the initial rating.
    async fn create_player(&self, name: &str, credential_digest: &str)
        -> Result<PlayerId, StoreError>;

    /// All players, by id.
    async fn list_players(&self) -> Result<Vec<Player>, StoreError>;

    /// Games newest first, skipping `offset` and returning at most `limit`.
    async fn list_games(&self, offset: usize, limit: usize) -> Result<Vec<GameRecord>, StoreError>;

    /// Every ongoing game, by id.
    async fn active_games(&self) -> Result<Vec<GameRecord>, StoreError>;

    /// Ongoing games `player` takes part in, by id.
    async fn active_games_for(&self, player: PlayerId) -> Result<Vec<GameRecord>, StoreError>;
}
