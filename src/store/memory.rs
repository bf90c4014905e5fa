//! In-Memory Store
//!
//! [`MemoryTables`] holds games and players and implements every write as
//! validate-then-mutate, so a rejected write leaves the tables untouched.
//! [`MemoryStore`] wraps the tables in an async lock; the file store reuses
//! the same tables for its snapshot.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{GameRecord, GameStore, StoreError, TurnCommit};
use crate::arena::game::GameId;
use crate::arena::player::{Player, PlayerId};
use crate::game::rating::INITIAL_RATING;
use crate::game::state::Outcome;

// =============================================================================
// TABLES
// =============================================================================

/// Games and players keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MemoryTables {
    next_game_id: u64,
    next_player_id: u64,
    games: BTreeMap<GameId, GameRecord>,
    players: BTreeMap<PlayerId, Player>,
}

/// Serialized form of [`MemoryTables`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    next_game_id: u64,
    next_player_id: u64,
    games: Vec<GameRecord>,
    players: Vec<Player>,
}

impl From<&MemoryTables> for Snapshot {
    fn from(tables: &MemoryTables) -> Self {
        Self {
            next_game_id: tables.next_game_id,
            next_player_id: tables.next_player_id,
            games: tables.games.values().cloned().collect(),
            players: tables.players.values().cloned().collect(),
        }
    }
}

impl From<Snapshot> for MemoryTables {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            next_game_id: snapshot.next_game_id,
            next_player_id: snapshot.next_player_id,
            games: snapshot.games.into_iter().map(|g| (g.id, g)).collect(),
            players: snapshot.players.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}

impl MemoryTables {
    pub(crate) fn create_game(
        &mut self,
        side_a: PlayerId,
        side_b: PlayerId,
        rows: usize,
        cols: usize,
    ) -> Result<GameId, StoreError> {
        for player in [side_a, side_b] {
            if !self.players.contains_key(&player) {
                return Err(StoreError::PlayerNotFound(player));
            }
        }

        self.next_game_id += 1;
        let id = GameId(self.next_game_id);
        self.games.insert(
            id,
            GameRecord {
                id,
                side_a,
                side_b,
                rows,
                cols,
                outcome: Outcome::Ongoing,
                turns: Vec::new(),
            },
        );
        Ok(id)
    }

    pub(crate) fn load_game(&self, id: GameId) -> Option<GameRecord> {
        self.games.get(&id).cloned()
    }

    pub(crate) fn append_turn(&mut self, commit: TurnCommit) -> Result<(), StoreError> {
        // Validate everything before touching any row.
        let game = self
            .games
            .get(&commit.game_id)
            .ok_or(StoreError::GameNotFound(commit.game_id))?;

        if game.outcome.is_finished() {
            return Err(StoreError::Conflict(format!(
                "game {} is already finished",
                commit.game_id
            )));
        }
        if commit.turn.turn_id as usize != game.turns.len() {
            return Err(StoreError::Conflict(format!(
                "game {} expects turn {}, got {}",
                commit.game_id,
                game.turns.len(),
                commit.turn.turn_id
            )));
        }
        for record in &commit.ratings {
            if !game.involves(record.player) {
                return Err(StoreError::Conflict(format!(
                    "player {} is not in game {}",
                    record.player, commit.game_id
                )));
            }
            if !self.players.contains_key(&record.player) {
                return Err(StoreError::PlayerNotFound(record.player));
            }
        }

        if let Some(game) = self.games.get_mut(&commit.game_id) {
            game.turns.push(commit.turn);
            game.outcome = commit.outcome;
        }
        for record in commit.ratings {
            if let Some(player) = self.players.get_mut(&record.player) {
                player.rating = record.rating;
                player.history.push(record.entry);
            }
        }
        Ok(())
    }

    pub(crate) fn load_player(&self, id: PlayerId) -> Option<Player> {
        self.players.get(&id).cloned()
    }

    pub(crate) fn find_player_by_credential(&self, digest: &str) -> Option<Player> {
        self.players
            .values()
            .find(|p| p.credential_digest == digest)
            .cloned()
    }

    pub(crate) fn create_player(
        &mut self,
        name: &str,
        credential_digest: &str,
    ) -> Result<PlayerId, StoreError> {
        if self.players.values().any(|p| p.name == name) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        self.next_player_id += 1;
        let id = PlayerId(self.next_player_id);
        self.players.insert(
            id,
            Player {
                id,
                name: name.to_string(),
                rating: INITIAL_RATING,
                credential_digest: credential_digest.to_string(),
                history: Vec::new(),
            },
        );
        Ok(id)
    }

    pub(crate) fn list_players(&self) -> Vec<Player> {
        self.players.values().cloned().collect()
    }

    pub(crate) fn list_games(&self, offset: usize, limit: usize) -> Vec<GameRecord> {
        self.games
            .values()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub(crate) fn active_games(&self) -> Vec<GameRecord> {
        self.games
            .values()
            .filter(|g| !g.outcome.is_finished())
            .cloned()
            .collect()
    }

    pub(crate) fn active_games_for(&self, player: PlayerId) -> Vec<GameRecord> {
        self.games
            .values()
            .filter(|g| !g.outcome.is_finished() && g.involves(player))
            .cloned()
            .collect()
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local [`GameStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn create_game(
        &self,
        side_a: PlayerId,
        side_b: PlayerId,
        rows: usize,
        cols: usize,
    ) -> Result<GameId, StoreError> {
        self.tables.write().await.create_game(side_a, side_b, rows, cols)
    }

    async fn load_game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.tables.read().await.load_game(id))
    }

    async fn append_turn(&self, commit: TurnCommit) -> Result<(), StoreError> {
        self.tables.write().await.append_turn(commit)
    }

    async fn load_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(self.tables.read().await.load_player(id))
    }

    async fn find_player_by_credential(&self, digest: &str) -> Result<Option<Player>, StoreError> {
        Ok(self.tables.read().await.find_player_by_credential(digest))
    }

    async fn create_player(
        &self,
        name: &str,
        credential_digest: &str,
    ) -> Result<PlayerId, StoreError> {
        self.tables.write().await.create_player(name, credential_digest)
    }

    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.tables.read().await.list_players())
    }

    async fn list_games(&self, offset: usize, limit: usize) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.tables.read().await.list_games(offset, limit))
    }

    async fn active_games(&self) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.tables.read().await.active_games())
    }

    async fn active_games_for(&self, player: PlayerId) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.tables.read().await.active_games_for(player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::player::HistoryEntry;
    use crate::game::board::{Side, Square};
    use crate::game::state::Turn;
    use crate::store::RatingRecord;

    fn opening(turn_id: u32) -> Turn {
        Turn::new(turn_id, Square::new(0, 0), Square::new(1, 0), Side::A)
    }

    async fn two_players(store: &MemoryStore) -> (PlayerId, PlayerId) {
        let a = store.create_player("alice", "d-alice").await.unwrap();
        let b = store.create_player("bob", "d-bob").await.unwrap();
        (a, b)
    }

    #[tokio::test]
    async fn test_create_and_load_player() {
        let store = MemoryStore::new();
        let id = store.create_player("alice", "digest").await.unwrap();

        let player = store.load_player(id).await.unwrap().unwrap();
        assert_eq!(player.name, "alice");
        assert_eq!(player.rating, INITIAL_RATING);
        assert!(player.history.is_empty());

        let found = store.find_player_by_credential("digest").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(id));
        assert!(store.find_player_by_credential("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let store = MemoryStore::new();
        store.create_player("alice", "d1").await.unwrap();
        let err = store.create_player("alice", "d2").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(name) if name == "alice"));
        assert_eq!(store.list_players().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_game_requires_players() {
        let store = MemoryStore::new();
        let (a, _) = two_players(&store).await;
        let err = store.create_game(a, PlayerId(99), 3, 3).await.unwrap_err();
        assert!(matches!(err, StoreError::PlayerNotFound(PlayerId(99))));
    }

    #[tokio::test]
    async fn test_append_turn_enforces_sequence() {
        let store = MemoryStore::new();
        let (a, b) = two_players(&store).await;
        let game = store.create_game(a, b, 3, 3).await.unwrap();

        let skipped = TurnCommit {
            game_id: game,
            turn: opening(1),
            outcome: Outcome::Ongoing,
            ratings: Vec::new(),
        };
        assert!(matches!(store.append_turn(skipped).await, Err(StoreError::Conflict(_))));

        let next = TurnCommit {
            game_id: game,
            turn: opening(0),
            outcome: Outcome::Ongoing,
            ratings: Vec::new(),
        };
        store.append_turn(next).await.unwrap();
        let record = store.load_game(game).await.unwrap().unwrap();
        assert_eq!(record.turns.len(), 1);
    }

    #[tokio::test]
    async fn test_finishing_commit_updates_players_together() {
        let store = MemoryStore::new();
        let (a, b) = two_players(&store).await;
        let game = store.create_game(a, b, 3, 3).await.unwrap();

        let commit = TurnCommit {
            game_id: game,
            turn: opening(0),
            outcome: Outcome::AWins,
            ratings: vec![
                RatingRecord {
                    player: a,
                    rating: 1016,
                    entry: HistoryEntry::for_side(game, Outcome::AWins, Side::A, 1016),
                },
                RatingRecord {
                    player: b,
                    rating: 984,
                    entry: HistoryEntry::for_side(game, Outcome::AWins, Side::B, 984),
                },
            ],
        };
        store.append_turn(commit).await.unwrap();

        let alice = store.load_player(a).await.unwrap().unwrap();
        let bob = store.load_player(b).await.unwrap().unwrap();
        assert_eq!((alice.rating, bob.rating), (1016, 984));
        assert!(alice.history[0].win);
        assert!(bob.history[0].loss);

        // Finished games accept nothing further.
        let late = TurnCommit {
            game_id: game,
            turn: opening(1),
            outcome: Outcome::AWins,
            ratings: Vec::new(),
        };
        assert!(matches!(store.append_turn(late).await, Err(StoreError::Conflict(_))));
        assert!(store.active_games_for(a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_commit_changes_nothing() {
        let store = MemoryStore::new();
        let (a, b) = two_players(&store).await;
        let game = store.create_game(a, b, 3, 3).await.unwrap();

        let commit = TurnCommit {
            game_id: game,
            turn: opening(0),
            outcome: Outcome::AWins,
            ratings: vec![RatingRecord {
                player: PlayerId(42),
                rating: 1016,
                entry: HistoryEntry::for_side(game, Outcome::AWins, Side::A, 1016),
            }],
        };
        assert!(store.append_turn(commit).await.is_err());

        let record = store.load_game(game).await.unwrap().unwrap();
        assert!(record.turns.is_empty());
        assert_eq!(record.outcome, Outcome::Ongoing);
    }

    #[tokio::test]
    async fn test_list_games_newest_first() {
        let store = MemoryStore::new();
        let (a, b) = two_players(&store).await;
        for _ in 0..5 {
            store.create_game(a, b, 3, 3).await.unwrap();
        }

        let ids: Vec<u64> = store
            .list_games(1, 3)
            .await
            .unwrap()
            .iter()
            .map(|g| g.id.0)
            .collect();
        assert_eq!(ids, vec![4, 3, 2]);
        assert!(store.list_games(10, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_games_skip_finished() {
        let store = MemoryStore::new();
        let (a, b) = two_players(&store).await;
        for _ in 0..3 {
            store.create_game(a, b, 3, 3).await.unwrap();
        }
        store
            .append_turn(TurnCommit {
                game_id: GameId(2),
                turn: opening(0),
                outcome: Outcome::AWins,
                ratings: Vec::new(),
            })
            .await
            .unwrap();

        let ids: Vec<u64> = store
            .active_games()
            .await
            .unwrap()
            .iter()
            .map(|g| g.id.0)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_snapshot_conversion_keeps_tables() {
        let mut tables = MemoryTables::default();
        let a = tables.create_player("alice", "x").unwrap();
        let b = tables.create_player("bob", "y").unwrap();
        tables.create_game(a, b, 5, 3).unwrap();

        let json = serde_json::to_string(&Snapshot::from(&tables)).unwrap();
        let restored = MemoryTables::from(serde_json::from_str::<Snapshot>(&json).unwrap());
        assert_eq!(restored, tables);
    }
}
