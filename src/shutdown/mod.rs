// Package shutdown provides graceful shutdown functionality.

use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::{Notify, RwLock};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_GRACEFUL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
#[error("graceful shutdown timeout exceeded")]
pub struct TimeoutError;

/// Graceful shutdown handler: a cancellation token plus a wait-group of
/// services that must report `done` before the process exits.
#[derive(Clone)]
pub struct GracefulShutdown {
    shutdown_token: CancellationToken,
    timeout: Arc<RwLock<Duration>>,
    pending: Arc<AtomicUsize>,
    finished: Arc<Notify>,
}

impl GracefulShutdown {
    /// Creates a new graceful shutdown handler
    pub fn new(shutdown_token: CancellationToken) -> Self {
        Self {
            shutdown_token,
            timeout: Arc::new(RwLock::new(DEFAULT_GRACEFUL_TIMEOUT)),
            pending: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(Notify::new()),
        }
    }

    /// Sets the graceful shutdown timeout
    pub async fn set_graceful_timeout(&self, timeout: Duration) {
        *self.timeout.write().await = timeout;
    }

    /// Registers `n` services to wait for.
    pub fn add(&self, n: usize) {
        self.pending.fetch_add(n, Ordering::SeqCst);
    }

    /// Marks one service as done.
    pub fn done(&self) {
        let prev = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or(0);
        if prev <= 1 {
            self.finished.notify_waiters();
        }
    }

    /// Number of services that have not reported done yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Waits for shutdown signal and then waits for all services to complete
    pub async fn await_shutdown(&self) -> Result<()> {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!(
                    component = "graceful-shutdown",
                    event = "os_signal",
                    signal = "SIGINT",
                    "cancellation started"
                );
            }
            _ = self.shutdown_token.cancelled() => {
                info!(
                    component = "graceful-shutdown",
                    event = "ctx_done",
                    "cancellation started"
                );
            }
        }

        self.cancel_and_await_with_timeout().await
    }

    async fn cancel_and_await_with_timeout(&self) -> Result<()> {
        self.shutdown_token.cancel();

        let timeout_duration = *self.timeout.read().await;

        match timeout(timeout_duration, self.wait_for_completion()).await {
            Ok(_) => {
                info!(
                    component = "graceful-shutdown",
                    event = "shutdown_success",
                    "service was gracefully shut down"
                );
                Ok(())
            }
            Err(_) => {
                warn!(
                    component = "graceful-shutdown",
                    event = "shutdown_timeout",
                    timeout_secs = timeout_duration.as_secs(),
                    pending = self.pending(),
                    "not all services were closed within timeout"
                );
                Err(TimeoutError.into())
            }
        }
    }

    async fn wait_for_completion(&self) {
        loop {
            // Register interest before checking the counter so a concurrent
            // `done` cannot slip between the check and the wait.
            let notified = self.finished.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_waits_for_done() {
        let token = CancellationToken::new();
        let gsh = GracefulShutdown::new(token.clone());
        gsh.add(2);

        let worker = gsh.clone();
        let worker_token = token.clone();
        tokio::spawn(async move {
            worker_token.cancelled().await;
            worker.done();
            worker.done();
        });

        token.cancel();
        gsh.await_shutdown().await.unwrap();
        assert_eq!(gsh.pending(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_times_out() {
        let token = CancellationToken::new();
        let gsh = GracefulShutdown::new(token.clone());
        gsh.set_graceful_timeout(Duration::from_millis(50)).await;
        gsh.add(1);

        token.cancel();
        let err = gsh.await_shutdown().await.unwrap_err();
        assert!(err.downcast_ref::<TimeoutError>().is_some());
    }

    #[test]
    fn test_done_never_underflows() {
        let gsh = GracefulShutdown::new(CancellationToken::new());
        gsh.done();
        assert_eq!(gsh.pending(), 0);
    }
}
