//! Arena errors and their fault class.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arena::game::GameId;
use crate::arena::player::PlayerId;
use crate::game::state::RuleError;
use crate::store::StoreError;

/// Who is at fault for a failed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The request was invalid; retrying it unchanged will fail again.
    Client,
    /// The server could not complete a valid request.
    Server,
}

/// Errors returned by registry and matchmaking operations.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// The move or board size breaks the rules.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// Not the caller's turn, or the turn's side does not match the mover.
    #[error("not your turn")]
    WrongTurn,

    /// Unknown game.
    #[error("game {0} not found")]
    GameNotFound(GameId),

    /// The game already has an outcome.
    #[error("game {0} is already over")]
    GameOver(GameId),

    /// Unknown player.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// Credential matches no player.
    #[error("invalid credential")]
    InvalidCredential,

    /// Name is already registered.
    #[error("name already taken: {0}")]
    DuplicateName(String),

    /// Malformed request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Stored turns of a game no longer replay.
    #[error("stored game {game} is corrupt: {source}")]
    CorruptGame {
        /// Affected game.
        game: GameId,
        /// Replay failure.
        source: RuleError,
    },

    /// Storage failed.
    #[error("persistence failure: {0}")]
    Persistence(#[source] StoreError),
}

impl ArenaError {
    /// Fault class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            ArenaError::CorruptGame { .. } | ArenaError::Persistence(_) => ErrorClass::Server,
            _ => ErrorClass::Client,
        }
    }
}

impl From<StoreError> for ArenaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateName(name) => ArenaError::DuplicateName(name),
            StoreError::GameNotFound(id) => ArenaError::GameNotFound(id),
            StoreError::PlayerNotFound(id) => ArenaError::PlayerNotFound(id),
            other => ArenaError::Persistence(other),
        }
    }
}
