//! Game Registry
//!
//! The only component that mutates shared game and player state.
//!
//! ## Locking
//!
//! Every turn takes the game's shard lock for its whole duration. A turn that
//! finishes the game additionally takes the shard locks of both players,
//! always after the game lock and in ascending shard order, so two games
//! finishing at once for the same player serialize their rating updates.
//!
//! ## Staging
//!
//! Turns are applied to a copy of the live game. The copy replaces the cached
//! game only after the store accepted the commit; a failed commit leaves the
//! cache exactly as it was.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::arena::error::ArenaError;
use crate::arena::game::{Game, GameId};
use crate::arena::player::{HistoryEntry, Player, PlayerId};
use crate::config::{ArenaConfig, BoardSize, DEFAULT_BOARD_SIZES};
use crate::core::locks::LockTable;
use crate::core::rng::{source_from_seed, RandomSource};
use crate::game::board::Side;
use crate::game::rating::update_ratings;
use crate::game::state::{GameState, Outcome, Turn};
use crate::network::auth::Credential;
use crate::store::{
    GameRecord, GameStore, JsonFileStore, MemoryStore, RatingRecord, StoreError, TurnCommit,
};

/// Games per page of [`GameRegistry::games`].
pub const PAGE_SIZE: usize = 10;

/// Ongoing games of one player, split by whose move it is.
#[derive(Clone, Debug, Default)]
pub struct ActiveGames {
    /// Games waiting for this player's move.
    pub my_turn: Vec<Game>,
    /// Games waiting for the opponent.
    pub awaiting: Vec<Game>,
}

/// Concurrency-safe owner of live games and players.
pub struct GameRegistry {
    store: Arc<dyn GameStore>,
    rng: Mutex<Box<dyn RandomSource>>,
    board_sizes: Vec<BoardSize>,
    /// Ongoing games that have been touched since startup.
    live: RwLock<BTreeMap<GameId, Game>>,
    game_locks: LockTable,
    player_locks: LockTable,
}

impl GameRegistry {
    /// Create a registry with default lock tables and board sizes.
    pub fn new(store: Arc<dyn GameStore>, rng: Box<dyn RandomSource>) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
            board_sizes: DEFAULT_BOARD_SIZES.to_vec(),
            live: RwLock::new(BTreeMap::new()),
            game_locks: LockTable::default(),
            player_locks: LockTable::default(),
        }
    }

    /// Create a registry over `store` tuned by `config`.
    pub fn with_config(store: Arc<dyn GameStore>, config: &ArenaConfig) -> Self {
        let board_sizes = if config.board_sizes.is_empty() {
            DEFAULT_BOARD_SIZES.to_vec()
        } else {
            config.board_sizes.clone()
        };

        Self {
            store,
            rng: Mutex::new(source_from_seed(config.rng_seed)),
            board_sizes,
            live: RwLock::new(BTreeMap::new()),
            game_locks: LockTable::new(config.lock_shards),
            player_locks: LockTable::new(config.lock_shards),
        }
    }

    /// Open the configured store and build a registry over it.
    pub async fn open(config: &ArenaConfig) -> Result<Self, ArenaError> {
        let store: Arc<dyn GameStore> = match &config.data_path {
            Some(path) => Arc::new(JsonFileStore::open(path).await?),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::with_config(store, config))
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    // =========================================================================
    // PLAYERS
    // =========================================================================

    /// Register a player and hand out their credential.
    ///
    /// The raw credential is returned exactly once; only its digest is kept.
    #[instrument(skip(self))]
    pub async fn register_player(&self, name: &str) -> Result<(Player, Credential), ArenaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ArenaError::InvalidRequest("name must not be empty".into()));
        }

        let credential = {
            let mut rng = self.rng.lock().await;
            Credential::generate(&mut **rng)
        };
        let id = self.store.create_player(name, &credential.digest()).await?;
        let player = self.player(id).await?;

        info!(player = %id, name, "Player registered");
        Ok((player, credential))
    }

    /// Resolve a credential to its player.
    pub async fn authenticate(&self, credential: &Credential) -> Result<Player, ArenaError> {
        self.store
            .find_player_by_credential(&credential.digest())
            .await?
            .ok_or(ArenaError::InvalidCredential)
    }

    /// Look up a player.
    pub async fn player(&self, id: PlayerId) -> Result<Player, ArenaError> {
        self.store
            .load_player(id)
            .await?
            .ok_or(ArenaError::PlayerNotFound(id))
    }

    /// All players, highest rating first.
    pub async fn leaderboard(&self) -> Result<Vec<Player>, ArenaError> {
        let mut players = self.store.list_players().await?;
        players.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.id.cmp(&b.id)));
        Ok(players)
    }

    // =========================================================================
    // GAME CREATION
    // =========================================================================

    /// Create a game between two distinct players with random sides.
    #[instrument(skip(self))]
    pub async fn create_game(
        &self,
        player_a: PlayerId,
        player_b: PlayerId,
        size: BoardSize,
    ) -> Result<Game, ArenaError> {
        if player_a == player_b {
            return Err(ArenaError::InvalidRequest("a player cannot play themselves".into()));
        }
        let state = GameState::new(size.rows, size.cols)?;
        if state.is_terminal() {
            return Err(ArenaError::InvalidRequest(format!("{size} board is decided before play")));
        }
        self.player(player_a).await?;
        self.player(player_b).await?;

        let swap = self.rng.lock().await.next_bool();
        let (side_a, side_b) = if swap {
            (player_b, player_a)
        } else {
            (player_a, player_b)
        };

        let id = self
            .store
            .create_game(side_a, side_b, size.rows, size.cols)
            .await?;
        // Not cached here: the game is visible in the store already and may
        // have taken a turn. The first turn loads it under the game lock.
        let game = Game {
            id,
            side_a,
            side_b,
            outcome: Outcome::Ongoing,
            state,
        };

        info!(game = %id, %side_a, %side_b, %size, "Game created");
        Ok(game)
    }

    /// Create a game on a board size drawn from the configured set.
    pub async fn create_match_game(
        &self,
        player_a: PlayerId,
        player_b: PlayerId,
    ) -> Result<Game, ArenaError> {
        let size = {
            let mut rng = self.rng.lock().await;
            let idx = rng.next_below(self.board_sizes.len() as u64) as usize;
            self.board_sizes
                .get(idx)
                .copied()
                .unwrap_or(DEFAULT_BOARD_SIZES[0])
        };
        self.create_game(player_a, player_b, size).await
    }

    // =========================================================================
    // TURNS
    // =========================================================================

    /// Apply one turn for `player` and persist it.
    ///
    /// Returns the game after the turn. On any error nothing is persisted and
    /// the live game is unchanged.
    #[instrument(skip(self))]
    pub async fn apply_turn(
        &self,
        game_id: GameId,
        player: PlayerId,
        turn: Turn,
    ) -> Result<Game, ArenaError> {
        let _game_guard = self.game_locks.lock(game_id.0).await;

        let mut staged = self.load_for_update(game_id).await?;
        if staged.is_finished() {
            return Err(ArenaError::GameOver(game_id));
        }

        let mover = staged.state.side_to_move();
        if turn.side != mover || staged.player_on(mover) != player {
            return Err(ArenaError::WrongTurn);
        }

        let recorded = *staged.state.apply(turn)?;
        staged.outcome = staged.state.winner();

        let commit = TurnCommit {
            game_id,
            turn: recorded,
            outcome: staged.outcome,
            ratings: Vec::new(),
        };

        if staged.is_finished() {
            let _player_guards = self
                .player_locks
                .lock_many(&[staged.side_a.0, staged.side_b.0])
                .await;
            let ratings = self.rating_records(&staged).await?;
            self.commit_turn(TurnCommit { ratings, ..commit }).await?;

            info!(game = %game_id, outcome = ?staged.outcome, "Game finished");
        } else {
            self.commit_turn(commit).await?;
        }

        #[cfg(feature = "debug-tracing")]
        debug!(game = %game_id, board = ?staged.state.board().to_codes(), "Board after turn");

        let mut live = self.live.write().await;
        if staged.is_finished() {
            live.remove(&game_id);
        } else {
            live.insert(game_id, staged.clone());
        }
        Ok(staged)
    }

    /// Apply a batch of turns, each independently.
    ///
    /// Returns the failures keyed by game; successful turns are not listed.
    pub async fn apply_turns(
        &self,
        player: PlayerId,
        batch: Vec<(GameId, Turn)>,
    ) -> BTreeMap<GameId, ArenaError> {
        let mut failures = BTreeMap::new();
        for (game_id, turn) in batch {
            if let Err(e) = self.apply_turn(game_id, player, turn).await {
                debug!(game = %game_id, %player, error = %e, "Bulk turn rejected");
                failures.insert(game_id, e);
            }
        }
        failures
    }

    /// Persist a turn. Callers hold the game lock.
    ///
    /// A conflict means the cached game no longer matches the store, so the
    /// cached copy is dropped and the next turn reloads it.
    async fn commit_turn(&self, commit: TurnCommit) -> Result<(), ArenaError> {
        let game_id = commit.game_id;
        match self.store.append_turn(commit).await {
            Err(StoreError::Conflict(reason)) => {
                warn!(game = %game_id, %reason, "Cached game diverged from store");
                self.live.write().await.remove(&game_id);
                Err(ArenaError::Persistence(StoreError::Conflict(reason)))
            }
            result => Ok(result?),
        }
    }

    /// New ratings and history lines for both players of a finished game.
    ///
    /// Callers hold both player locks.
    async fn rating_records(&self, game: &Game) -> Result<Vec<RatingRecord>, ArenaError> {
        let player_a = self.player(game.side_a).await?;
        let player_b = self.player(game.side_b).await?;

        let Some((rating_a, rating_b)) =
            update_ratings(player_a.rating, player_b.rating, game.outcome)
        else {
            return Ok(Vec::new());
        };

        Ok(vec![
            RatingRecord {
                player: player_a.id,
                rating: rating_a,
                entry: HistoryEntry::for_side(game.id, game.outcome, Side::A, rating_a),
            },
            RatingRecord {
                player: player_b.id,
                rating: rating_b,
                entry: HistoryEntry::for_side(game.id, game.outcome, Side::B, rating_b),
            },
        ])
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Load a game for mutation. Callers hold the game lock.
    async fn load_for_update(&self, id: GameId) -> Result<Game, ArenaError> {
        if let Some(game) = self.live.read().await.get(&id) {
            return Ok(game.clone());
        }

        let record = self
            .store
            .load_game(id)
            .await?
            .ok_or(ArenaError::GameNotFound(id))?;
        let game = hydrate(&record)?;
        if !game.is_finished() {
            self.live.write().await.insert(id, game.clone());
        }
        Ok(game)
    }

    /// Look up a game.
    pub async fn game(&self, id: GameId) -> Result<Game, ArenaError> {
        if let Some(game) = self.live.read().await.get(&id) {
            return Ok(game.clone());
        }
        let record = self
            .store
            .load_game(id)
            .await?
            .ok_or(ArenaError::GameNotFound(id))?;
        hydrate(&record)
    }

    /// One page of games, newest first. Pages start at 1.
    pub async fn games(&self, page: usize) -> Result<Vec<Game>, ArenaError> {
        if page == 0 {
            return Err(ArenaError::InvalidRequest("pages start at 1".into()));
        }
        let records = self
            .store
            .list_games((page - 1) * PAGE_SIZE, PAGE_SIZE)
            .await?;
        records.iter().map(hydrate).collect()
    }

    /// Every ongoing game, by id.
    pub async fn active_games(&self) -> Result<Vec<Game>, ArenaError> {
        let records = self.store.active_games().await?;
        records.iter().map(hydrate).collect()
    }

    /// Ongoing games of `player`, split by whose move it is.
    pub async fn active_games_for(&self, player: PlayerId) -> Result<ActiveGames, ArenaError> {
        let mut active = ActiveGames::default();
        for record in self.store.active_games_for(player).await? {
            let game = hydrate(&record)?;
            if game.player_to_move() == player {
                active.my_turn.push(game);
            } else {
                active.awaiting.push(game);
            }
        }
        Ok(active)
    }

    /// Number of ongoing games held in memory.
    pub async fn live_games(&self) -> usize {
        self.live.read().await.len()
    }
}

/// Rebuild a stored game, reporting replay failures as corruption.
fn hydrate(record: &GameRecord) -> Result<Game, ArenaError> {
    Game::from_record(record).map_err(|source| {
        warn!(game = %record.id, error = %source, "Stored game does not replay");
        ArenaError::CorruptGame {
            game: record.id,
            source,
        }
    })
}
