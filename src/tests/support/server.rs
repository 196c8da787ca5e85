// Server bootstrap for end-to-end tests.

use std::net::SocketAddr;
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::app::App;
use crate::config::{self, Config};
use crate::liveness;
use crate::shutdown::GracefulShutdown;

static METRICS: Once = Once::new();

/// A running server bound to 127.0.0.1 on an ephemeral port.
pub struct KvServer {
    addr: SocketAddr,
    shutdown_token: CancellationToken,
    graceful: Arc<GracefulShutdown>,
}

impl KvServer {
    /// Starts a server with the default test config and metrics enabled.
    pub async fn start() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut cfg = config::new_test_config();
        cfg.kv.metrics = Some(config::Metrics { enabled: true });
        Self::start_with(cfg).await
    }

    /// Starts a server with the given config.
    pub async fn start_with(
        cfg: Config,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if cfg.is_metrics_enabled() {
            // The recorder is process-global; later installs would fail.
            METRICS.call_once(|| {
                let _ = crate::controller::metrics::init_prometheus_exporter();
            });
        }

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let shutdown_token = CancellationToken::new();
        let probe =
            Arc::new(liveness::Probe::new(Duration::from_secs(1))) as Arc<dyn liveness::Prober>;
        let app = App::new(shutdown_token.clone(), cfg, probe).await?;

        let graceful = Arc::new(GracefulShutdown::new(shutdown_token.clone()));
        graceful.add(1);
        app.serve_on(listener, graceful.clone()).await?;

        let server = Self {
            addr,
            shutdown_token,
            graceful,
        };
        server.wait_alive().await?;
        Ok(server)
    }

    async fn wait_alive(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let probe_url = self.url("/k8s/probe");
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);

        while tokio::time::Instant::now() < deadline {
            if let Ok(resp) = reqwest::get(&probe_url).await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Err("timed out waiting for server to become alive".into())
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub fn base(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Builds an absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stops the server and waits for the app to report done.
    pub async fn stop(self) {
        self.shutdown_token.cancel();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.graceful.pending() > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for KvServer {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}
