// Shutdown handling module
//
// The accept loop waits on a `Shutdown` handle; signals only trigger it.
//
// Supported signals:
// - SIGINT:  Shutdown (Ctrl+C)
// - SIGTERM: Shutdown (Unix only)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Cloneable cancellation handle for the serve loop
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    notify: Arc<Notify>,
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown; wakes every current and future waiter
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        // Register before checking the flag so a concurrent trigger is not lost
        let notified = self.notify.notified();
        if self.is_triggered() {
            return;
        }
        notified.await;
    }
}

/// Spawn a task that triggers `shutdown` on SIGINT or SIGTERM
///
/// Handlers are registered before this returns, so a signal arriving right
/// after startup is not lost. Must be called inside a Tokio runtime.
#[cfg(unix)]
pub fn spawn_signal_listener(shutdown: Shutdown) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(int), Ok(term)) => (int, term),
            (Err(e), _) | (_, Err(e)) => {
                logger::log_warning(&format!("Failed to register signal handlers: {e}"));
                tokio::spawn(async move { wait_for_ctrl_c(&shutdown).await });
                return;
            }
        };

    tokio::spawn(async move {
        let reason = tokio::select! {
            _ = sigint.recv() => "SIGINT (Ctrl+C)",
            _ = sigterm.recv() => "SIGTERM",
            () = shutdown.wait() => return,
        };
        logger::log_shutdown_requested(reason);
        shutdown.trigger();
    });
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn spawn_signal_listener(shutdown: Shutdown) {
    tokio::spawn(async move {
        wait_for_ctrl_c(&shutdown).await;
    });
}

async fn wait_for_ctrl_c(shutdown: &Shutdown) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => {
                logger::log_shutdown_requested("Ctrl+C");
                shutdown.trigger();
            }
            Err(e) => logger::log_error(&format!("Failed to listen for Ctrl+C: {e}")),
        },
        () = shutdown.wait() => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_before_wait() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        assert!(shutdown.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), shutdown.wait())
            .await
            .expect("wait should return immediately");
    }

    #[tokio::test]
    async fn test_trigger_wakes_clones() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.clone();
        let task = tokio::spawn(async move { waiter.wait().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
