//! Sharded concurrent map: hashing, shard routing and per-shard locking.

pub mod error;
pub mod hasher;
pub mod indexer;
pub mod map;
pub mod shard;

#[cfg(test)]
mod shard_test;

// Re-export main types
pub use error::{ErrorKind, HashError, StoreError};
pub use hasher::{Algorithm, KeyHasher};
pub use indexer::ShardIndexer;
pub use map::{ShardedMap, DEFAULT_NUM_OF_SHARDS};
pub use shard::Shard;
