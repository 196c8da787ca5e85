//! HTTP server implementation.
//

use anyhow::{Context, Result};
use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

use crate::config::{Config, ConfigTrait};
use crate::controller::controller::Controller;
use crate::middleware::middleware::Middleware;

const DEFAULT_NAME: &str = "shardkv";
const DEFAULT_PORT: &str = "8080";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Server trait for HTTP server operations.
#[async_trait::async_trait]
pub trait Server: Send + Sync {
    /// Binds the configured port and serves until shutdown.
    async fn listen_and_serve(&self) -> Result<()>;

    /// Serves on an already bound listener until shutdown.
    async fn serve(&self, listener: TcpListener) -> Result<()>;
}

/// HTTP server implementation.
pub struct HttpServer {
    shutdown_token: CancellationToken,
    config: Config,
    router: Router,
}

impl HttpServer {
    /// Creates a new HTTP server.
    pub fn new(
        shutdown_token: CancellationToken,
        config: Config,
        controllers: Vec<Box<dyn Controller>>,
        middlewares: Vec<Box<dyn Middleware>>,
    ) -> Result<Arc<Self>> {
        let router = Self::build_router(controllers);
        let router = Self::merge_middlewares(router, middlewares);

        Ok(Arc::new(Self {
            shutdown_token,
            config,
            router,
        }))
    }

    /// Returns the composed router (useful for in-process drivers).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    fn name(&self) -> &str {
        self.config
            .api()
            .and_then(|api| api.name.as_deref())
            .unwrap_or(DEFAULT_NAME)
    }

    /// Resolves the listen address from the `api.port` setting.
    fn addr(&self) -> Result<SocketAddr> {
        let port = self
            .config
            .api()
            .and_then(|api| api.port.as_deref())
            .unwrap_or(DEFAULT_PORT);
        let port = port.trim_start_matches(':');

        format!("0.0.0.0:{}", port)
            .parse::<SocketAddr>()
            .context("Failed to parse server address")
    }

    /// Binds the configured address and serves.
    pub async fn listen_and_serve(&self) -> Result<()> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind TCP listener on {}", addr))?;

        self.serve(listener).await
    }

    /// Serves on the given listener with graceful shutdown on cancellation.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let name = self.name().to_string();
        let addr = listener
            .local_addr()
            .context("Failed to read listener address")?;

        info!(
            component = "server",
            event = "started",
            name = %name,
            addr = %addr,
            "server started"
        );

        let shutdown_token = self.shutdown_token.clone();
        let serve_future =
            axum::serve(listener, self.router.clone()).with_graceful_shutdown(async move {
                shutdown_token.cancelled().await;
            });

        if let Err(e) = serve_future.await {
            error!(
                component = "server",
                event = "listen_and_serve_failed",
                name = %name,
                addr = %addr,
                error = %e,
                "server failed to listen and serve"
            );
            return Err(e.into());
        }

        info!(
            component = "server",
            event = "stopped",
            name = %name,
            addr = %addr,
            "server stopped"
        );

        Ok(())
    }

    /// Builds the router with all controllers.
    fn build_router(controllers: Vec<Box<dyn Controller>>) -> Router {
        let mut router = Router::new();

        for controller in controllers {
            router = controller.add_route(router);
        }

        router.fallback(route_not_found)
    }

    /// Merges middlewares into the router.
    fn merge_middlewares(router: Router, middlewares: Vec<Box<dyn Middleware>>) -> Router {
        let mut result = router;

        // Applied in reverse so the first middleware in the list is the outermost layer.
        for middleware in middlewares.iter().rev() {
            result = middleware.apply(result);
        }

        result.layer(TimeoutLayer::new(REQUEST_TIMEOUT))
    }
}

/// Unmatched paths answer with the same JSON error body as the API.
/// Keys containing `/` must be percent-encoded, e.g. `/api/a%2Fb`.
async fn route_not_found(uri: Uri) -> impl IntoResponse {
    let status = StatusCode::NOT_FOUND;
    (
        status,
        Json(json!({
            "status": status.as_u16(),
            "error": format!("no route for {}", uri.path()),
        })),
    )
}

#[async_trait::async_trait]
impl Server for HttpServer {
    async fn listen_and_serve(&self) -> Result<()> {
        HttpServer::listen_and_serve(self).await
    }

    async fn serve(&self, listener: TcpListener) -> Result<()> {
        HttpServer::serve(self, listener).await
    }
}
