// Main key-value application implementation.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::liveness;
use crate::shutdown::GracefulShutdown;

use super::server::{Http, HttpServer};

/// Encapsulates the entire application state.
///
/// The store is created here once and handed to the HTTP layer by `Arc`.
#[derive(Clone)]
pub struct App {
    shutdown_token: CancellationToken,
    storage: Arc<dyn db::Storage>,
    probe: Arc<dyn liveness::Prober>,
    server: Arc<dyn Http>,
}

impl App {
    /// Creates a new application instance.
    pub async fn new(
        shutdown_token: CancellationToken,
        cfg: Config,
        probe: Arc<dyn liveness::Prober>,
    ) -> Result<Self> {
        let storage: Arc<dyn db::Storage> = db::DB::new(&cfg)?;
        let http_server = Arc::new(HttpServer::new(
            shutdown_token.clone(),
            cfg,
            storage.clone(),
            probe.clone(),
        )?);

        Ok(Self {
            shutdown_token,
            storage,
            probe,
            server: http_server,
        })
    }

    /// Returns the store shared with the HTTP layer.
    pub fn storage(&self) -> Arc<dyn db::Storage> {
        self.storage.clone()
    }

    /// Serves on the configured port, handles graceful shutdown.
    pub async fn serve(&self, gsh: Arc<GracefulShutdown>) -> Result<()> {
        self.start(None, gsh)
    }

    /// Serves on an already bound listener, handles graceful shutdown.
    pub async fn serve_on(&self, listener: TcpListener, gsh: Arc<GracefulShutdown>) -> Result<()> {
        self.start(Some(listener), gsh)
    }

    fn start(&self, listener: Option<TcpListener>, gsh: Arc<GracefulShutdown>) -> Result<()> {
        // Register liveness target before serving.
        self.probe
            .watch(vec![Arc::new(self.clone()) as Arc<dyn liveness::Service>]);

        let server = self.server.clone();
        let app_for_close = self.clone();

        tokio::task::spawn(async move {
            let result = match listener {
                Some(listener) => server.serve(listener).await,
                None => server.listen_and_serve().await,
            };
            if let Err(e) = result {
                error!(
                    component = "app",
                    scope = "server",
                    event = "serve_failed",
                    error = %e,
                    "server failed to serve"
                );
            }

            if let Err(e) = app_for_close.close().await {
                error!(
                    component = "app",
                    scope = "shutdown",
                    event = "close_failed",
                    error = %e,
                    "application close failed"
                );
            }

            // Signal graceful shutdown
            gsh.done();
        });

        info!(
            component = "app",
            event = "started",
            "application lifecycle"
        );

        Ok(())
    }

    /// Checks whether the HTTP server is still alive.
    pub fn is_alive(&self) -> bool {
        if !self.server.is_alive() {
            warn!(
                component = "app",
                scope = "http_server",
                event = "gone_away",
                "http server has gone away"
            );
            return false;
        }
        true
    }

    /// Closes application resources.
    pub async fn close(&self) -> Result<()> {
        if let Err(e) = self.storage.close().await {
            error!(
                component = "app",
                scope = "storage",
                event = "close_failed",
                error = %e,
                "error closing storage"
            );
        }

        self.shutdown_token.cancel();

        info!(
            component = "app",
            event = "stopped",
            "application lifecycle"
        );

        Ok(())
    }
}

/// AppService implements liveness::Service for the App
impl liveness::Service for App {
    fn is_alive(&self, _timeout: Duration) -> bool {
        self.is_alive()
    }
}
