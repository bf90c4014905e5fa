//! Core primitives.
//!
//! Randomness, hashing and lock tables shared by the game engine and the
//! arena layer. Nothing here knows about boards or players.

pub mod rng;
pub mod hash;
pub mod locks;

// Re-export core types
pub use rng::{DeterministicRng, EntropyRng, RandomSource};
pub use hash::{StateHash, StateHasher};
pub use locks::LockTable;
