//! Sharded Lock Tables
//!
//! A fixed number of async mutexes indexed by a mixed hash of an id. The
//! table never grows, so ids of finished games and retired players leave
//! nothing behind.
//!
//! Two ids may share a shard. That only adds contention, never a deadlock:
//! [`LockTable::lock_many`] deduplicates shards and always acquires them in
//! ascending shard order.

use std::collections::BTreeSet;

use tokio::sync::{Mutex, MutexGuard};

use super::rng::splitmix64;

/// Default number of shards per table.
pub const DEFAULT_LOCK_SHARDS: usize = 64;

/// A bounded table of async mutexes keyed by `u64` ids.
#[derive(Debug)]
pub struct LockTable {
    shards: Vec<Mutex<()>>,
}

impl LockTable {
    /// Create a table with `shards` mutexes (at least one).
    pub fn new(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Number of shards.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Always false; a table has at least one shard.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Shard index for an id.
    pub fn shard_of(&self, key: u64) -> usize {
        let mut state = key;
        (splitmix64(&mut state) % self.shards.len() as u64) as usize
    }

    /// Lock the shard owning `key`.
    pub async fn lock(&self, key: u64) -> MutexGuard<'_, ()> {
        self.shards[self.shard_of(key)].lock().await
    }

    /// Lock the shards owning every key, each at most once, in ascending
    /// shard order.
    pub async fn lock_many(&self, keys: &[u64]) -> Vec<MutexGuard<'_, ()>> {
        let order: BTreeSet<usize> = keys.iter().map(|k| self.shard_of(*k)).collect();
        let mut guards = Vec::with_capacity(order.len());
        for shard in order {
            guards.push(self.shards[shard].lock().await);
        }
        guards
    }
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_SHARDS)
    }
}
