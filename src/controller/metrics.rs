//! Metrics controller.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Arc, OnceLock};

use crate::db::Storage;
use crate::http::Controller;

pub const PROMETHEUS_METRICS_PATH: &str = "/metrics";

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder as the global `metrics` recorder.
///
/// Must be called once, before the tokio runtime starts.
pub fn init_prometheus_exporter() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Prometheus handle already initialized"))?;

    Ok(())
}

/// PrometheusMetricsController handles Prometheus metrics endpoint.
pub struct PrometheusMetricsController {
    db: Arc<dyn Storage>,
}

impl PrometheusMetricsController {
    /// Creates a new Prometheus metrics controller.
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    /// Handles the metrics request.
    async fn get_metrics(State(db): State<Arc<dyn Storage>>) -> impl IntoResponse {
        let Some(handle) = PROMETHEUS_HANDLE.get() else {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain; charset=utf-8")],
                "# metrics exporter is not installed\n".to_string(),
            );
        };

        // Entry count is a full shard walk, so it is refreshed on scrape only.
        let (entries, _) = db.stat();
        crate::metrics::set_entries(entries);

        (
            StatusCode::OK,
            [("content-type", "text/plain; charset=utf-8")],
            handle.render(),
        )
    }
}

impl Controller for PrometheusMetricsController {
    fn add_route(&self, router: Router) -> Router {
        let routes = Router::new()
            .route(PROMETHEUS_METRICS_PATH, get(Self::get_metrics))
            .with_state(self.db.clone());
        router.merge(routes)
    }
}
