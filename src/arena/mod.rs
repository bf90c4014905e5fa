//! Arena Layer
//!
//! Shared, concurrently mutated state: registered players, live games and
//! the matchmaking queue. Rule logic is delegated to `game/`, durability to
//! `store/`.
//!
//! ## Module Structure
//!
//! - `player`: Player records and rating history
//! - `game`: Game records rebuilt from stored turns
//! - `registry`: Locking, staged turn commits and rating finalisation
//! - `matchmaking`: Single-slot pairing queue
//! - `error`: Arena error taxonomy

pub mod error;
pub mod player;
pub mod game;
pub mod registry;
pub mod matchmaking;

pub use error::{ArenaError, ErrorClass};
pub use game::{Game, GameId};
pub use matchmaking::{MatchQueue, MatchResponse, MatchTicket};
pub use player::{HistoryEntry, Player, PlayerId};
pub use registry::{ActiveGames, GameRegistry, PAGE_SIZE};
