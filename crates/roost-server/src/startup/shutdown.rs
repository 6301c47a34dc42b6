//! Shutdown coordination
//!
//! A single `ShutdownSignal` is created at startup and cloned wherever work
//! must stop early. The signal is a latch: waiting on it after it tripped
//! returns immediately.

use std::{future::Future, sync::Arc};

use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ShutdownSignal {
    tripped: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tripped, _) = watch::channel(false);
        Self {
            tripped: Arc::new(tripped),
        }
    }

    /// A signal tripped by Ctrl+C or SIGTERM
    pub fn from_os_signals() -> Self {
        let signal = Self::new();
        let trip = signal.clone();

        tokio::spawn(async move {
            let name = os_signal().await;
            info!(signal = name, "Shutdown requested");
            trip.trigger();
        });

        signal
    }

    pub fn trigger(&self) {
        self.tripped.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tripped.borrow()
    }

    /// Resolves once the signal has tripped
    pub async fn triggered(&self) {
        let mut rx = self.tripped.subscribe();
        // The sender lives in `self`, so this only returns on a trip
        let _ = rx.wait_for(|tripped| *tripped).await;
    }

    /// Drive `future` to completion unless shutdown starts first
    pub async fn run_until<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            result = future => Some(result),
            _ = self.triggered() => {
                warn!("Shutdown requested, abandoning startup step");
                None
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of the first OS signal received. A handler that cannot be installed
/// is logged and never fires.
async fn os_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
