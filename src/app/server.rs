// HTTP server wiring for the key-value application.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::db::Storage;
use crate::http::{Controller, Middleware, Server as HttpServerTrait};
use crate::liveness;

/// Http is the application-facing view of the HTTP server.
#[async_trait::async_trait]
pub trait Http: Send + Sync {
    async fn listen_and_serve(&self) -> Result<()>;
    async fn serve(&self, listener: TcpListener) -> Result<()>;
    fn is_alive(&self) -> bool;
}

/// HTTP server implementation that wraps all dependencies.
pub struct HttpServer {
    server: Arc<dyn HttpServerTrait>,
    is_server_alive: Arc<AtomicBool>,
}

impl HttpServer {
    /// Creates a new HttpServer with all controllers and middlewares.
    pub fn new(
        ctx: CancellationToken,
        cfg: Config,
        db: Arc<dyn Storage>,
        probe: Arc<dyn liveness::Prober>,
    ) -> Result<Self> {
        let controllers = Self::controllers(&cfg, db, probe);
        let middlewares = Self::middlewares();
        let server = crate::http::HttpServer::new(ctx, cfg, controllers, middlewares)?;

        Ok(Self {
            server,
            is_server_alive: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns all HTTP controllers for the server.
    fn controllers(
        cfg: &Config,
        db: Arc<dyn Storage>,
        probe: Arc<dyn liveness::Prober>,
    ) -> Vec<Box<dyn Controller>> {
        use crate::controller;

        let mut controllers: Vec<Box<dyn Controller>> = vec![
            // Healthcheck probe endpoint
            Box::new(controller::LivenessProbeController::new(probe)),
            // GET/POST/DELETE on /api/
            Box::new(controller::KvController::new(db.clone())),
        ];

        if cfg.is_metrics_enabled() {
            // Metrics endpoint
            controllers.push(Box::new(controller::PrometheusMetricsController::new(db)));
        }

        controllers
    }

    /// Returns the request middlewares for the server, outermost first.
    fn middlewares() -> Vec<Box<dyn Middleware>> {
        vec![
            // Exec first - request span
            Box::new(crate::middleware::trace_middleware::TraceMiddleware::new()),
            // Exec second - panic recovery
            Box::new(crate::middleware::recover_middleware::PanicRecoverMiddleware::new()),
        ]
    }

    async fn track<F>(&self, fut: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        self.is_server_alive.store(true, Ordering::Relaxed);
        let result = fut.await;
        self.is_server_alive.store(false, Ordering::Relaxed);
        result
    }
}

#[async_trait::async_trait]
impl Http for HttpServer {
    async fn listen_and_serve(&self) -> Result<()> {
        self.track(self.server.listen_and_serve()).await
    }

    async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.track(self.server.serve(listener)).await
    }

    fn is_alive(&self) -> bool {
        self.is_server_alive.load(Ordering::Relaxed)
    }
}
