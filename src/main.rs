//! Breakthrough Arena Server
//!
//! Demo driver: registers players, pairs them through the matchmaking queue,
//! plays every game to the end with random legal moves and checks that each
//! finished game replays from storage to the same state hash.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use breakthrough::{
    arena::{ArenaError, GameId, GameRegistry, MatchQueue, MatchResponse, PlayerId},
    config::ArenaConfig,
    core::hash::{to_hex, StateHash},
    core::rng::DeterministicRng,
    network::{GameListView, JsonMessage, PlayerView},
    Game, VERSION,
};

/// Games requested by each demo player.
const GAMES_PER_PLAYER: u32 = 2;

/// Upper bound on demo rounds; every game ends long before this.
const MAX_ROUNDS: usize = 10_000;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ArenaConfig::from_env().context("invalid configuration")?;
    info!("Breakthrough Arena Server v{}", VERSION);
    info!(
        "Board sizes: {}",
        config
            .board_sizes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let registry = GameRegistry::open(&config)
        .await
        .context("failed to open game store")?;
    demo_arena(&registry, &config).await
}

/// Run a full arena round and verify reconstruction.
async fn demo_arena(registry: &GameRegistry, config: &ArenaConfig) -> Result<()> {
    info!("=== Registering Players ===");
    let existing = registry.leaderboard().await?.len();
    let mut players = Vec::new();
    for i in 0..config.demo_players {
        let name = format!("player-{}", existing + i + 1);
        let (player, _credential) = registry.register_player(&name).await?;
        info!("Registered {} as #{}", player.name, player.id);
        players.push(player.id);
    }

    info!("=== Matchmaking ===");
    let queue = MatchQueue::new();
    for player in &players {
        match queue.request_match(registry, *player, GAMES_PER_PLAYER).await? {
            MatchResponse::Waiting => info!("#{} is waiting", player),
            MatchResponse::Matched { opponent, created, errors } => {
                info!("#{} matched with #{}: {} games", player, opponent, created);
                for e in errors {
                    warn!("Game creation failed: {}", e);
                }
            }
        }
    }
    if let Some(ticket) = queue.queued().await {
        info!("#{} still waiting for {} games", ticket.player, ticket.remaining);
        queue.cancel(ticket.player).await;
    }

    let active = registry.active_games().await?;
    info!("{} games in progress", active.len());
    debug!("Active games: {}", GameListView::from(active.as_slice()).to_json()?);

    info!("=== Playing ===");
    let seed = config.rng_seed.unwrap_or(12345);
    let mut rng = DeterministicRng::new(seed);
    let finished = play_out(registry, &players, &mut rng).await?;
    info!("{} games finished", finished.len());

    info!("=== Leaderboard ===");
    for (rank, player) in registry.leaderboard().await?.iter().enumerate() {
        info!("#{}: {}", rank + 1, PlayerView::from(player).to_json()?);
    }

    info!("=== Verifying Determinism ===");
    for (id, live_hash) in &finished {
        let record = registry
            .store()
            .load_game(*id)
            .await?
            .with_context(|| format!("game {id} missing from store"))?;
        let replayed = Game::from_record(&record)?;
        let replay_hash = replayed.state.compute_hash();

        if replay_hash != *live_hash {
            bail!(
                "DETERMINISM FAILURE in game {}: {} != {}",
                id,
                to_hex(live_hash),
                to_hex(&replay_hash)
            );
        }
    }
    info!("DETERMINISM VERIFIED: {} games replay to identical hashes", finished.len());
    Ok(())
}

/// Play random legal moves until no player has a game waiting on them.
///
/// Returns the final state hash of every game that finished.
async fn play_out(
    registry: &GameRegistry,
    players: &[PlayerId],
    rng: &mut DeterministicRng,
) -> Result<BTreeMap<GameId, StateHash>> {
    let mut finished = BTreeMap::new();

    for _ in 0..MAX_ROUNDS {
        let mut moved = false;
        for player in players {
            let active = registry.active_games_for(*player).await?;
            for game in active.my_turn {
                let moves: Vec<_> = game.state.legal_moves().collect();
                let Some(turn) = rng.choose(&moves).copied() else {
                    continue;
                };

                match registry.apply_turn(game.id, *player, turn).await {
                    Ok(after) => {
                        moved = true;
                        if after.is_finished() {
                            info!(
                                "Game {} ({}x{}) ended after {} turns: {:?}",
                                after.id,
                                after.state.rows(),
                                after.state.cols(),
                                after.state.history().len(),
                                after.outcome
                            );
                            finished.insert(after.id, after.state.compute_hash());
                        }
                    }
                    Err(e @ ArenaError::Persistence(_)) => return Err(e.into()),
                    Err(e) => warn!("Turn in game {} rejected: {}", game.id, e),
                }
            }
        }
        if !moved {
            return Ok(finished);
        }
    }

    bail!("games still running after {MAX_ROUNDS} rounds")
}
