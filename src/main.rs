// Main entrypoint for the shardkv service.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use shardkv::app;
use shardkv::config::{Config, ConfigTrait};
use shardkv::liveness;
use shardkv::shutdown::GracefulShutdown;

const CONFIG_PATH: &str = "cfg/shardkv.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/shardkv.cfg.local.yaml";
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// shardkv - sharded in-memory key-value store with an HTTP API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<(Config, String)> {
    if let Some(custom_path) = path {
        let cfg = Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path))?;
        return Ok((cfg, custom_path.display().to_string()));
    }

    match Config::load(PathBuf::from(CONFIG_PATH_LOCAL)) {
        Ok(cfg) => Ok((cfg, CONFIG_PATH_LOCAL.to_string())),
        Err(_) => {
            let cfg = Config::load(PathBuf::from(CONFIG_PATH))
                .with_context(|| format!("failed to load config from {}", CONFIG_PATH))?;
            Ok((cfg, CONFIG_PATH.to_string()))
        }
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_deref())
        .unwrap_or("info");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        // Production: JSON format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        // Development: Pretty console format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

/// Builds the tokio runtime sized by `runtime.num_cpus` (0 means all cores).
fn build_runtime(cfg: &Config) -> Result<tokio::runtime::Runtime> {
    let configured = cfg.runtime().num_cpus;
    let workers = if configured == 0 {
        num_cpus::get()
    } else {
        configured
    };

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (cfg, cfg_path) = load_cfg(args.cfg)?;
    configure_logger(&cfg);

    info!(
        component = "config",
        event = "load_success",
        path = %cfg_path,
        "config loaded"
    );

    // The recorder must be installed before the runtime starts.
    if cfg.is_metrics_enabled() {
        if let Err(e) = shardkv::controller::metrics::init_prometheus_exporter() {
            warn!(
                component = "main",
                event = "metrics_init_failed",
                error = %e,
                "metrics endpoint will not be available"
            );
        }
    }

    let runtime = build_runtime(&cfg)?;
    info!(
        component = "main",
        event = "num_cpus_configured",
        num_cpus = cfg.runtime().num_cpus,
        "runtime configured (0 means all available cores)"
    );

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<()> {
    let shutdown_token = CancellationToken::new();

    let graceful_shutdown = Arc::new(GracefulShutdown::new(shutdown_token.clone()));
    graceful_shutdown.set_graceful_timeout(GRACEFUL_TIMEOUT).await;

    let probe_timeout = cfg
        .k8s()
        .and_then(|k8s| k8s.probe.timeout)
        .unwrap_or(DEFAULT_PROBE_TIMEOUT);
    let probe = Arc::new(liveness::Probe::new(probe_timeout)) as Arc<dyn liveness::Prober>;

    let app = app::App::new(shutdown_token.clone(), cfg, probe).await?;

    graceful_shutdown.add(1);
    if let Err(e) = app.serve(graceful_shutdown.clone()).await {
        error!(
            component = "main",
            scope = "app",
            event = "start_failed",
            error = %e,
            "failed to start app"
        );
        graceful_shutdown.done();
        return Err(e);
    }

    // Listen for OS signals or cancellation and wait for graceful shutdown
    if let Err(e) = graceful_shutdown.await_shutdown().await {
        error!(
            component = "main",
            scope = "service",
            event = "graceful_shutdown_failed",
            error = %e,
            "failed to gracefully shut down service"
        );
        return Err(e);
    }

    Ok(())
}
