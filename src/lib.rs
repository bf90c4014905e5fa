//! # Breakthrough Arena Server
//!
//! Turn-based arena for the Breakthrough board game: rule engine,
//! matchmaking, Elo ratings and the concurrency discipline around them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  BREAKTHROUGH ARENA SERVER                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  ├── rng.rs      - Seeded Xoroshiro128+ and entropy sources │
//! │  ├── hash.rs     - Domain-separated SHA-256 hashing          │
//! │  └── locks.rs    - Sharded async lock tables                 │
//! │                                                              │
//! │  game/           - Rule engine (pure, deterministic)         │
//! │  ├── board.rs    - Grid, sides, squares                      │
//! │  ├── moves.rs    - Lazy legal-move generation                │
//! │  ├── state.rs    - Turns, outcomes, apply and winner         │
//! │  └── rating.rs   - Elo update                                │
//! │                                                              │
//! │  arena/          - Shared mutable state                      │
//! │  ├── registry.rs - Games, players, staged turn commits       │
//! │  └── matchmaking.rs - Single-slot pairing queue              │
//! │                                                              │
//! │  store/          - Persistence gateway                       │
//! │  ├── memory.rs   - In-memory tables                          │
//! │  └── file.rs     - JSON snapshot file                        │
//! │                                                              │
//! │  network/        - Wire views and credentials                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `game/` modules are **fully deterministic**: a game rebuilt by
//! replaying its stored turns has the same board and the same state hash as
//! the live game that produced them. All randomness (side assignment, board
//! sizes, credentials) lives in the registry behind an injected
//! [`RandomSource`](core::rng::RandomSource).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod arena;
pub mod config;
pub mod core;
pub mod game;
pub mod network;
pub mod store;

// Re-export commonly used types
pub use arena::{ArenaError, Game, GameId, GameRegistry, MatchQueue, Player, PlayerId};
pub use config::{ArenaConfig, BoardSize};
pub use core::rng::DeterministicRng;
pub use game::{GameState, Outcome, Side, Square, Turn};
pub use store::{GameStore, JsonFileStore, MemoryStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
