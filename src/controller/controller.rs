// HTTP controller trait for route registration.

use axum::Router;

/// Trait for adding routes to the HTTP server.
pub trait Controller: Send + Sync {
    /// Adds routes to the router.
    ///
    /// Controllers with state usually build their own sub-router and merge it:
    /// ```rust
    /// # use axum::{Router, routing::get};
    /// # async fn handler() -> &'static str { "ok" }
    /// let routes: Router<()> = Router::new().route("/api/:key", get(handler));
    /// let router: Router<()> = Router::new().merge(routes);
    /// # let _ = router;
    /// ```
    fn add_route(&self, router: Router) -> Router;
}
