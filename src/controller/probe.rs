// Liveness probe controller.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::http::Controller;
use crate::liveness;

pub const PROBE_PATH: &str = "/k8s/probe";

const SUCCESS_RESPONSE: &str = r#"{
  "status": 200,
  "message": "I'm fine :D"
}"#;

const FAILED_RESPONSE: &str = r#"{
  "status": 503,
  "message": "I'm tired :("
}"#;

/// LivenessProbeController handles Kubernetes liveness probes.
pub struct LivenessProbeController {
    probe: Arc<dyn liveness::Prober>,
}

impl LivenessProbeController {
    /// Creates a new liveness probe controller.
    pub fn new(probe: Arc<dyn liveness::Prober>) -> Self {
        Self { probe }
    }

    /// Handles the probe request.
    async fn probe(State(probe): State<Arc<dyn liveness::Prober>>) -> Response {
        if probe.is_alive().await {
            (StatusCode::OK, SUCCESS_RESPONSE).into_response()
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, FAILED_RESPONSE).into_response()
        }
    }
}

impl Controller for LivenessProbeController {
    fn add_route(&self, router: Router) -> Router {
        let routes = Router::new()
            .route(PROBE_PATH, get(Self::probe))
            .with_state(self.probe.clone());
        router.merge(routes)
    }
}
