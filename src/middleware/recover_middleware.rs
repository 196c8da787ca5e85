//! Panic recovery middleware.
//

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    Router,
};
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

/// Global panic counter.
static PANICS_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Gets the current panic counter value.
pub fn panics_counter() -> u64 {
    PANICS_COUNTER.load(Ordering::Relaxed)
}

/// Increments the panic counter.
pub fn inc_panics() {
    PANICS_COUNTER.fetch_add(1, Ordering::Relaxed);
    crate::metrics::add_panics(1);
}

/// Turns a caught handler panic into a 500 response.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    inc_panics();

    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(
        component = "http",
        event = "panic_recovered",
        panic = %details,
        "handler panicked"
    );

    let body = serde_json::json!({
        "status": 500,
        "error": "internal server error",
    })
    .to_string();

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// PanicRecoverMiddleware recovers from panics in HTTP handlers.
pub struct PanicRecoverMiddleware;

impl PanicRecoverMiddleware {
    /// Creates a new panic recovery middleware.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PanicRecoverMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::middleware::middleware::Middleware for PanicRecoverMiddleware {
    fn apply(&self, router: Router) -> Router {
        router.layer(CatchPanicLayer::custom(handle_panic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::middleware::Middleware;
    use axum::{http::Request, routing::get};
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let before = panics_counter();
        let router = PanicRecoverMiddleware::new().apply(Router::new().route("/boom", get(boom)));

        let resp = router
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(panics_counter() > before);
    }
}
