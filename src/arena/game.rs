//! Live games.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::player::PlayerId;
use crate::game::board::Side;
use crate::game::state::{GameState, Outcome, RuleError};
use crate::store::GameRecord;

/// Game identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A game with its players and rebuilt state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    /// Identifier.
    pub id: GameId,
    /// Player on side A.
    pub side_a: PlayerId,
    /// Player on side B.
    pub side_b: PlayerId,
    /// Outcome; never returns to ongoing once set.
    pub outcome: Outcome,
    /// Board and history.
    pub state: GameState,
}

impl Game {
    /// Rebuild a game by replaying its stored turns.
    pub fn from_record(record: &GameRecord) -> Result<Self, RuleError> {
        let state = GameState::replay(record.rows, record.cols, &record.turns)?;
        Ok(Self {
            id: record.id,
            side_a: record.side_a,
            side_b: record.side_b,
            outcome: record.outcome,
            state,
        })
    }

    /// The player controlling `side`.
    pub fn player_on(&self, side: Side) -> PlayerId {
        match side {
            Side::A => self.side_a,
            Side::B => self.side_b,
        }
    }

    /// The side `player` controls, if they play in this game.
    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        if player == self.side_a {
            Some(Side::A)
        } else if player == self.side_b {
            Some(Side::B)
        } else {
            None
        }
    }

    /// The player whose move it is.
    pub fn player_to_move(&self) -> PlayerId {
        self.player_on(self.state.side_to_move())
    }

    /// Whether the game has finished.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_finished()
    }
}
