//! Hash-to-shard mapping.

use std::num::NonZeroUsize;

use super::error::StoreError;
use super::hasher::KeyHasher;

/// Maps keys to shard indices in `[0, shard_count)` as `hash(key) % shard_count`.
///
/// This is the only place that knows how digests relate to the shard layout;
/// shards themselves only ever see keys.
pub struct ShardIndexer<H: KeyHasher> {
    hasher: H,
    shard_count: NonZeroUsize,
}

impl<H: KeyHasher> ShardIndexer<H> {
    pub fn new(hasher: H, shard_count: NonZeroUsize) -> Self {
        Self {
            hasher,
            shard_count,
        }
    }

    /// Returns the shard index for `key`.
    pub fn index(&self, key: &str) -> Result<usize, StoreError> {
        let digest = self
            .hasher
            .hash(key)
            .map_err(|source| StoreError::HashFailure {
                key: key.to_string(),
                source,
            })?;
        // Remainder is < shard_count, which already fits in usize.
        Ok((digest % self.shard_count.get() as u64) as usize)
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count.get()
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}
