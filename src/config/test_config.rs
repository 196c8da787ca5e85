use super::{Config, KvBox};
use std::time::Duration;

/// Creates a new test configuration.
pub fn new_test_config() -> Config {
    Config {
        kv: KvBox {
            env: super::TEST.to_string(),
            logs: Some(super::Logs {
                level: Some("debug".to_string()),
            }),
            runtime: Some(super::Runtime { num_cpus: 4 }),
            api: Some(super::Api {
                name: Some("shardkv:0".to_string()),
                port: Some("0".to_string()),
            }),
            storage: Some(super::Storage {
                shards: Some(128),
                hasher: Some(crate::db::storage::Algorithm::Crc32),
            }),
            metrics: Some(super::Metrics { enabled: false }),
            k8s: Some(super::K8S {
                probe: super::Probe {
                    timeout: Some(Duration::from_secs(1)),
                },
            }),
        },
    }
}
