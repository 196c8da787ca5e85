//! Key hashing used for shard routing.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use super::error::HashError;

/// Maps a key to a 64-bit digest.
///
/// Implementations must be deterministic for the life of the process: the same
/// key always yields the same digest. No collision resistance is required.
pub trait KeyHasher: Send + Sync {
    fn hash(&self, key: &str) -> Result<u64, HashError>;
}

/// Built-in hashing algorithms, selectable from config (`storage.hasher`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// CRC-32 (IEEE polynomial) of the key bytes, read back with its bytes
    /// swapped (big-endian checksum bytes taken as a little-endian integer),
    /// so keys keep the shard placement of the Go service this replaces.
    #[default]
    Crc32,
    /// 64-bit XXH3 of the key bytes.
    Xxh3,
}

impl KeyHasher for Algorithm {
    fn hash(&self, key: &str) -> Result<u64, HashError> {
        let bytes = key.as_bytes();
        match self {
            Algorithm::Crc32 => Ok(u64::from(crc32fast::hash(bytes).swap_bytes())),
            Algorithm::Xxh3 => Ok(xxh3_64(bytes)),
        }
    }
}

impl<H: KeyHasher + ?Sized> KeyHasher for std::sync::Arc<H> {
    fn hash(&self, key: &str) -> Result<u64, HashError> {
        (**self).hash(key)
    }
}
