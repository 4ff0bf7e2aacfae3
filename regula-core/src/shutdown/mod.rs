//! Shutdown coordinator
//!
//! Owns the root [`CancellationToken`] that scheduled work (review timers,
//! download countdowns) derives its own tokens from, so a single shutdown
//! call stops every pending timer.

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Shutdown signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Graceful,
    Immediate,
}

/// Shutdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
    Shutdown,
}

/// Shutdown coordinator
pub struct ShutdownCoordinator {
    state: Arc<RwLock<ShutdownState>>,
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
    root: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            state: Arc::new(RwLock::new(ShutdownState::Running)),
            shutdown_tx,
            root: CancellationToken::new(),
        }
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownSignal> {
        self.shutdown_tx.subscribe()
    }

    /// Token cancelled when shutdown starts
    pub fn child_token(&self) -> CancellationToken {
        self.root.child_token()
    }

    /// Cancel scheduled work and notify subscribers
    pub async fn shutdown(&self) {
        self.stop(ShutdownSignal::Graceful).await;
    }

    /// Same as [`shutdown`](Self::shutdown), announced as immediate
    pub async fn shutdown_immediately(&self) {
        self.stop(ShutdownSignal::Immediate).await;
    }

    async fn stop(&self, signal: ShutdownSignal) {
        let mut state = self.state.write().await;
        if *state != ShutdownState::Running {
            warn!("Shutdown already in progress");
            return;
        }
        match signal {
            ShutdownSignal::Graceful => info!("Initiating graceful shutdown"),
            ShutdownSignal::Immediate => warn!("Initiating immediate shutdown"),
        }
        *state = ShutdownState::ShuttingDown;
        drop(state);

        self.root.cancel();

        // No subscribers is fine; there is simply nobody to tell.
        if self.shutdown_tx.receiver_count() > 0 {
            if let Err(e) = self.shutdown_tx.send(signal) {
                error!("Failed to send shutdown signal: {}", e);
            }
        }

        *self.state.write().await = ShutdownState::Shutdown;
        info!("Shutdown complete");
    }

    /// Check if shutdown is in progress
    pub async fn is_shutting_down(&self) -> bool {
        let state = self.state.read().await;
        *state == ShutdownState::ShuttingDown || *state == ShutdownState::Shutdown
    }

    /// Get current state
    pub async fn state(&self) -> ShutdownState {
        *self.state.read().await
    }

    /// Wait until shutdown starts
    pub async fn wait_for_shutdown(&self) {
        self.root.cancelled().await;
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Trigger a graceful shutdown on Ctrl+C
pub fn install_signal_handlers(coordinator: Arc<ShutdownCoordinator>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C");
                coordinator.shutdown().await;
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });
}
