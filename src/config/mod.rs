// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::db::storage::Algorithm;

pub const PROD: &str = "prod";
#[allow(dead_code)]
pub const DEV: &str = "dev";
#[allow(dead_code)]
pub const TEST: &str = "test";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Kv {
    #[serde(rename = "kv")]
    pub kv: KvBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KvBox {
    pub env: String,
    pub logs: Option<Logs>,
    pub runtime: Option<Runtime>,
    pub api: Option<Api>,
    pub storage: Option<Storage>,
    pub metrics: Option<Metrics>,
    pub k8s: Option<K8S>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Api {
    pub name: Option<String>,
    pub port: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Runtime {
    pub num_cpus: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Probe {
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct K8S {
    pub probe: Probe,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metrics {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

/// Shard layout. Signed so that a negative count in YAML is reported as an
/// invalid configuration instead of a parse error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    pub shards: Option<i64>,
    pub hasher: Option<Algorithm>,
}

static DEFAULT_STORAGE: Storage = Storage {
    shards: None,
    hasher: None,
};

static DEFAULT_RUNTIME: Runtime = Runtime { num_cpus: 0 };

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    #[allow(dead_code)]
    fn is_test(&self) -> bool;
    fn runtime(&self) -> &Runtime;
    fn api(&self) -> Option<&Api>;
    fn storage(&self) -> &Storage;
    fn metrics(&self) -> Option<&Metrics>;
    fn k8s(&self) -> Option<&K8S>;
}

// Config type alias for convenience
pub type Config = Kv;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.kv.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.kv.env == PROD
    }

    fn is_test(&self) -> bool {
        self.kv.env == TEST
    }

    fn runtime(&self) -> &Runtime {
        self.kv.runtime.as_ref().unwrap_or(&DEFAULT_RUNTIME)
    }

    fn api(&self) -> Option<&Api> {
        self.kv.api.as_ref()
    }

    fn storage(&self) -> &Storage {
        self.kv.storage.as_ref().unwrap_or(&DEFAULT_STORAGE)
    }

    fn metrics(&self) -> Option<&Metrics> {
        self.kv.metrics.as_ref()
    }

    fn k8s(&self) -> Option<&K8S> {
        self.kv.k8s.as_ref()
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        Self::parse(&data).with_context(|| format!("unmarshal yaml from {:?}", abs_path))
    }

    /// Parses configuration from YAML text.
    pub fn parse(data: &str) -> Result<Self> {
        let cfg: Kv = serde_yaml::from_str(data)?;

        if let Some(shards) = cfg.kv.storage.as_ref().and_then(|s| s.shards) {
            if shards <= 0 {
                anyhow::bail!("invalid storage.shards: must be positive, got {}", shards);
            }
        }

        Ok(cfg)
    }

    /// Returns true when the Prometheus exporter should be installed.
    pub fn is_metrics_enabled(&self) -> bool {
        self.metrics().map(|m| m.enabled).unwrap_or(false)
    }
}

// Test config is always available for integration tests
mod test_config;
#[allow(dead_code)]
pub use test_config::new_test_config;
