//! Matchmaking Queue
//!
//! A single waiting slot. A player asks for a number of games; if someone is
//! already waiting, the two are paired for as many games as both still want
//! and whoever has games left over keeps (or takes) the slot.
//!
//! The pairing arithmetic runs under the queue lock. Games are created after
//! the lock is released, so a slow store never blocks other requests.

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::arena::error::ArenaError;
use crate::arena::player::PlayerId;
use crate::arena::registry::GameRegistry;

/// A player waiting for games.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchTicket {
    /// Waiting player.
    pub player: PlayerId,
    /// Games still wanted.
    pub remaining: u32,
}

/// Result of a matchmaking request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchResponse {
    /// No opponent yet; the request is queued (or already was).
    Waiting,
    /// Paired with the queued player.
    Matched {
        /// The player who was waiting.
        opponent: PlayerId,
        /// Games created.
        created: u32,
        /// One message per game that could not be created.
        errors: Vec<String>,
    },
}

/// Single-slot matchmaking queue.
#[derive(Debug, Default)]
pub struct MatchQueue {
    slot: Mutex<Option<MatchTicket>>,
}

impl MatchQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `desired` games against whoever is waiting.
    #[instrument(skip(self, registry))]
    pub async fn request_match(
        &self,
        registry: &GameRegistry,
        player: PlayerId,
        desired: u32,
    ) -> Result<MatchResponse, ArenaError> {
        if desired == 0 {
            return Err(ArenaError::InvalidRequest("game count must be at least 1".into()));
        }

        let (opponent, count) = {
            let mut slot = self.slot.lock().await;
            match slot.take() {
                None => {
                    *slot = Some(MatchTicket { player, remaining: desired });
                    debug!(%player, desired, "Queued for matchmaking");
                    return Ok(MatchResponse::Waiting);
                }
                Some(queued) if queued.player == player => {
                    *slot = Some(queued);
                    debug!(%player, "Still waiting for an opponent");
                    return Ok(MatchResponse::Waiting);
                }
                Some(mut queued) => {
                    let count = desired.min(queued.remaining);
                    queued.remaining -= count;
                    let left_over = desired - count;

                    if queued.remaining > 0 {
                        *slot = Some(queued);
                    } else if left_over > 0 {
                        *slot = Some(MatchTicket { player, remaining: left_over });
                    }
                    (queued.player, count)
                }
            }
        };

        let mut created = 0;
        let mut errors = Vec::new();
        for _ in 0..count {
            match registry.create_match_game(player, opponent).await {
                Ok(_) => created += 1,
                Err(e) => {
                    warn!(%player, %opponent, error = %e, "Matched game not created");
                    errors.push(e.to_string());
                }
            }
        }

        info!(%player, %opponent, created, "Match found");
        Ok(MatchResponse::Matched { opponent, created, errors })
    }

    /// Withdraw `player`'s queued request. Returns whether one was queued.
    pub async fn cancel(&self, player: PlayerId) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.map(|t| t.player) == Some(player) {
            *slot = None;
            debug!(%player, "Matchmaking cancelled");
            true
        } else {
            false
        }
    }

    /// The currently queued ticket.
    pub async fn queued(&self) -> Option<MatchTicket> {
        *self.slot.lock().await
    }
}
