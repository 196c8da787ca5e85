//! Request tracing middleware.

use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// TraceMiddleware emits a span per request and logs response status and latency.
pub struct TraceMiddleware;

impl TraceMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TraceMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::middleware::middleware::Middleware for TraceMiddleware {
    fn apply(&self, router: Router) -> Router {
        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
    }
}
