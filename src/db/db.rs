// Key-value storage database backed by the sharded map.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, ConfigTrait};
use crate::db::storage::{Algorithm, ShardedMap, StoreError};

const COMP_STORAGE: &str = "storage";

/// Opaque value stored under a key. Any JSON shape, including `null`.
pub type Payload = Arc<serde_json::Value>;

/// The three-operation contract every driver (HTTP, tests, CLI) talks to.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Retrieves the payload stored for the key.
    fn get(&self, key: &str) -> Result<Payload, StoreError>;

    /// Stores the payload if the key is absent.
    fn store(&self, key: &str, value: Payload) -> Result<(), StoreError>;

    /// Removes the key.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Returns storage statistics: (entry_count, shard_count).
    fn stat(&self) -> (usize, usize);

    /// Gracefully closes storage.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Main storage database: owns the sharded map for the process lifetime.
pub struct DB {
    map: ShardedMap<Payload, Algorithm>,
}

impl DB {
    /// Builds the sharded map from the `storage` config section.
    pub fn new(cfg: &Config) -> Result<Arc<Self>> {
        let map = ShardedMap::from_config(cfg)?;
        let hasher = cfg.storage().hasher.unwrap_or_default();

        info!(
            component = COMP_STORAGE,
            event = "initialized",
            shards = map.shard_count(),
            hasher = ?hasher,
            "sharded map initialized"
        );

        Ok(Arc::new(Self { map }))
    }
}

#[async_trait::async_trait]
impl Storage for DB {
    fn get(&self, key: &str) -> Result<Payload, StoreError> {
        self.map.get(key)
    }

    fn store(&self, key: &str, value: Payload) -> Result<(), StoreError> {
        self.map.store(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.map.delete(key)
    }

    fn stat(&self) -> (usize, usize) {
        (self.map.len(), self.map.shard_count())
    }

    async fn close(&self) -> Result<()> {
        info!(
            component = COMP_STORAGE,
            event = "closed",
            entries = self.map.len(),
            "in-memory entries dropped on close"
        );
        Ok(())
    }
}
