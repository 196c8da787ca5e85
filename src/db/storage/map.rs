//! Sharded concurrent map with insert-once semantics.

use std::num::NonZeroUsize;

use crate::config::{Config, ConfigTrait};

use super::error::StoreError;
use super::hasher::{Algorithm, KeyHasher};
use super::indexer::ShardIndexer;
use super::shard::Shard;

/// Shard count used when config does not set one.
pub const DEFAULT_NUM_OF_SHARDS: usize = 128;

/// ShardedMap routes every key to exactly one of a fixed set of shards.
///
/// There is no map-wide lock: each call computes the shard index once and
/// works only with that shard. The shard vector is never mutated after
/// construction.
pub struct ShardedMap<V, H: KeyHasher = Algorithm> {
    indexer: ShardIndexer<H>,
    shards: Vec<Shard<V>>,
}

impl<V: Clone> ShardedMap<V, Algorithm> {
    /// Creates a map with `shard_count` shards and the default hasher.
    pub fn new(shard_count: usize) -> Result<Self, StoreError> {
        Self::with_hasher(shard_count, Algorithm::default())
    }

    /// Creates a map laid out according to the `storage` config section.
    pub fn from_config(cfg: &Config) -> Result<Self, StoreError> {
        let storage = cfg.storage();
        let shards = match storage.shards {
            None => DEFAULT_NUM_OF_SHARDS,
            Some(n) if n <= 0 => {
                return Err(StoreError::InvalidConfiguration(format!(
                    "shard count must be positive, got {}",
                    n
                )))
            }
            Some(n) => usize::try_from(n).map_err(|_| {
                StoreError::InvalidConfiguration(format!("shard count {} is too large", n))
            })?,
        };
        Self::with_hasher(shards, storage.hasher.unwrap_or_default())
    }
}

impl<V: Clone, H: KeyHasher> ShardedMap<V, H> {
    /// Creates a map with `shard_count` shards routed by `hasher`.
    pub fn with_hasher(shard_count: usize, hasher: H) -> Result<Self, StoreError> {
        let count = NonZeroUsize::new(shard_count).ok_or_else(|| {
            StoreError::InvalidConfiguration("shard count must be positive, got 0".to_string())
        })?;

        let shards = (0..shard_count).map(Shard::new).collect();

        Ok(Self {
            indexer: ShardIndexer::new(hasher, count),
            shards,
        })
    }

    /// Gets the value stored for the key.
    ///
    /// A stored "empty" payload is returned as-is; only a missing key yields
    /// `NotFound`.
    pub fn get(&self, key: &str) -> Result<V, StoreError> {
        self.shard(key)?
            .get(key)
            .ok_or_else(|| StoreError::not_found(key))
    }

    /// Stores the value if the key is absent. Never overwrites.
    pub fn store(&self, key: &str, value: V) -> Result<(), StoreError> {
        if self.shard(key)?.insert_new(key, value) {
            Ok(())
        } else {
            Err(StoreError::already_exists(key))
        }
    }

    /// Removes the key.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        if self.shard(key)?.remove(key) {
            Ok(())
        } else {
            Err(StoreError::not_found(key))
        }
    }

    /// Checks whether the key is present.
    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.shard(key)?.contains(key))
    }

    /// Gets the index of the shard that owns the key.
    pub fn shard_index(&self, key: &str) -> Result<usize, StoreError> {
        self.indexer.index(key)
    }

    /// Gets the shard that owns the key.
    pub fn shard(&self, key: &str) -> Result<&Shard<V>, StoreError> {
        let idx = self.indexer.index(key)?;
        Ok(&self.shards[idx])
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Gets the number of entries across all shards.
    ///
    /// Shards are read one after another, so the result is not a snapshot
    /// under concurrent writes.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Shard::is_empty)
    }

    /// Walks over shards in index order.
    pub fn walk_shards<F>(&self, mut f: F)
    where
        F: FnMut(usize, &Shard<V>),
    {
        for (idx, shard) in self.shards.iter().enumerate() {
            f(idx, shard);
        }
    }
}
