//! JSON Snapshot Store
//!
//! Keeps the tables in memory and rewrites a JSON snapshot after every write.
//! A write is applied to a copy of the tables, the copy is written to a
//! temporary file that is then renamed over the snapshot, and only then does
//! the copy replace the live tables. A failed write therefore leaves both the
//! file and the tables as they were.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::memory::{MemoryTables, Snapshot};
use super::{GameRecord, GameStore, StoreError, TurnCommit};
use crate::arena::game::GameId;
use crate::arena::player::{Player, PlayerId};

/// [`GameStore`] persisted to a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tables: RwLock<MemoryTables>,
}

impl JsonFileStore {
    /// Open a snapshot, starting empty when the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let tables = match tokio::fs::read(&path).await {
            Ok(bytes) => MemoryTables::from(serde_json::from_slice::<Snapshot>(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryTables::default(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), "Opened game store");

        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    async fn persist(&self, tables: &MemoryTables) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&Snapshot::from(tables))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "Snapshot written");
        Ok(())
    }

    /// Apply a write to a staged copy, persist it, then publish it.
    async fn commit<T>(
        &self,
        write: impl FnOnce(&mut MemoryTables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let value = write(&mut staged)?;
        self.persist(&staged).await?;
        *tables = staged;
        Ok(value)
    }
}

#[async_trait]
impl GameStore for JsonFileStore {
    async fn create_game(
        &self,
        side_a: PlayerId,
        side_b: PlayerId,
        rows: usize,
        cols: usize,
    ) -> Result<GameId, StoreError> {
        self.commit(|t| t.create_game(side_a, side_b, rows, cols)).await
    }

    async fn load_game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.tables.read().await.load_game(id))
    }

    async fn append_turn(&self, commit: TurnCommit) -> Result<(), StoreError> {
        self.commit(|t| t.append_turn(commit)).await
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
        self.commit(|t| t.create_player(name, credential_digest)).await
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
