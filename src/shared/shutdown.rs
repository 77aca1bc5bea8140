//! Graceful shutdown handling
//!
//! One broadcast signal shared by the HTTP server and the signal listener.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};

/// Shutdown signal that can be cloned and shared across tasks
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            info!("Shutdown signal triggered");
            let _ = self.sender.send(());
        }
    }

    /// Resolve once [`trigger`](Self::trigger) has been called, even if that
    /// happened before the wait started.
    pub async fn wait(&self) {
        let mut rx = self.sender.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Listen for OS shutdown signals (SIGTERM, SIGINT)
pub async fn listen_for_shutdown_signals(shutdown: ShutdownSignal) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to install signal handlers: {}", e);
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT (Ctrl+C)"),
        }
        shutdown.trigger();
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            return;
        }
        info!("Received Ctrl+C");
        shutdown.trigger();
    }
}

/// Owns the process-wide shutdown signal
pub struct ShutdownCoordinator {
    signal: ShutdownSignal,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            signal: ShutdownSignal::new(),
        }
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn start_signal_listener(&self) {
        let signal = self.signal.clone();
        tokio::spawn(async move {
            listen_for_shutdown_signals(signal).await;
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn wait_returns_after_trigger() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        tokio::task::yield_now().await;
        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn late_waiters_do_not_hang() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .unwrap();
    }
}
