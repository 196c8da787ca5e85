// HTTP API controllers.

pub mod controller;
pub mod kv;
pub mod metrics;
pub mod probe;

// Re-export controller types for convenience
pub use kv::KvController;
pub use metrics::PrometheusMetricsController;
pub use probe::LivenessProbeController;
