//! Graceful Shutdown Handler
//!
//! Owns the governing cancellation token and tracks lookups still running.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Shutdown coordinator for graceful termination.
///
/// The token it hands out is threaded into the dispatcher's accept loop,
/// rate-limiter waits and network I/O.
#[derive(Clone)]
pub struct ShutdownController {
    token: CancellationToken,
    /// Number of lookups still being served
    active_lookups: Arc<AtomicUsize>,
    /// Notify when all lookups are drained
    drain_complete: Arc<Notify>,
}

impl ShutdownController {
    /// Create a new shutdown controller.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            active_lookups: Arc::new(AtomicUsize::new(0)),
            drain_complete: Arc::new(Notify::new()),
        }
    }

    /// Token cancelled when shutdown starts.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Initiate graceful shutdown.
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("initiating graceful shutdown");
            self.token.cancel();
        }
    }

    pub fn active_lookups(&self) -> usize {
        self.active_lookups.load(Ordering::SeqCst)
    }

    fn lookup_ended(&self) {
        let prev = self.active_lookups.fetch_sub(1, Ordering::SeqCst);
        if prev == 1 {
            self.drain_complete.notify_waiters();
        }
    }

    /// Wait for all lookups to drain (with timeout).
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let drained = async {
            loop {
                let notified = self.drain_complete.notified();
                if self.active_lookups() == 0 {
                    return;
                }
                notified.await;
            }
        };

        tokio::select! {
            _ = drained => true,
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!(
                    "drain timeout: {} lookups still active",
                    self.active_lookups()
                );
                false
            }
        }
    }

    /// Create a guard that counts one lookup until dropped.
    pub fn lookup_guard(&self) -> LookupGuard {
        self.active_lookups.fetch_add(1, Ordering::SeqCst);
        LookupGuard {
            controller: self.clone(),
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for tracking active lookups.
///
/// Automatically decrements the lookup count when dropped.
pub struct LookupGuard {
    controller: ShutdownController,
}

impl Drop for LookupGuard {
    fn drop(&mut self) {
        self.controller.lookup_ended();
    }
}

/// Install signal handlers for graceful shutdown.
///
/// Completes once Ctrl+C or SIGTERM arrives, after cancelling the token.
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn shutdown_signal(controller: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating shutdown");
        }
        _ = controller.token.cancelled() => return,
    }

    controller.shutdown();
}
