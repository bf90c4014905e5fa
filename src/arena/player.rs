//! Players and rating history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::game::GameId;
use crate::game::board::Side;
use crate::game::state::Outcome;

/// Player identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One finished game in a player's history.
///
/// Exactly one of `win`, `draw` and `loss` is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The finished game.
    #[serde(rename = "id")]
    pub game: GameId,
    /// Player won.
    pub win: bool,
    /// Game was drawn.
    pub draw: bool,
    /// Player lost.
    pub loss: bool,
    /// Rating after the game.
    #[serde(rename = "elo")]
    pub rating: i32,
}

impl HistoryEntry {
    /// History line for the player on `side` of a finished game.
    pub fn for_side(game: GameId, outcome: Outcome, side: Side, rating: i32) -> Self {
        let draw = outcome == Outcome::Draw;
        let win = outcome.winner() == Some(side);
        Self {
            game,
            win,
            draw,
            loss: !win && !draw,
            rating,
        }
    }
}

/// A registered player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Identifier.
    pub id: PlayerId,
    /// Unique display name.
    pub name: String,
    /// Current Elo rating.
    pub rating: i32,
    /// Digest of the player's credential.
    pub credential_digest: String,
    /// Finished games, oldest first.
    pub history: Vec<HistoryEntry>,
}
