//! Graceful shutdown.
//!
//! [`ShutdownSignal`] tells the accept loop and every open connection to stop
//! taking new requests. [`ConnectionTracker`] lets the server wait for the
//! connections that were already open to finish.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use tracker_server::ShutdownSignal;
//!
//! let shutdown = ShutdownSignal::new();
//! tokio::select! {
//!     () = shutdown.recv() => println!("shutting down"),
//!     () = tokio::time::sleep(Duration::from_secs(60)) => println!("timeout"),
//! }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};
use tracing::{error, info, warn};

/// A cloneable, one-way shutdown flag.
///
/// Once triggered it stays triggered; [`recv`](Self::recv) returns
/// immediately for waiters that arrive late.
///
/// # Example
///
/// ```rust
/// use tracker_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let other = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(other.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates a signal triggered by SIGINT or SIGTERM.
    ///
    /// Must be called from inside a Tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });

        signal
    }

    /// Triggers shutdown for every clone of this signal.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    /// Returns true once shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Waits until shutdown is triggered.
    pub async fn recv(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => log_ctrl_c(result),
                    _ = terminate.recv() => info!("received SIGTERM"),
                }
                return;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM, only SIGINT will stop the server");
            }
        }
    }

    log_ctrl_c(tokio::signal::ctrl_c().await);
}

fn log_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => info!("received SIGINT"),
        Err(e) => error!(error = %e, "cannot listen for SIGINT"),
    }
}

/// Counts open connections so shutdown can wait for them.
///
/// # Example
///
/// ```rust
/// use tracker_server::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let token = tracker.acquire();
/// assert_eq!(tracker.active(), 1);
///
/// drop(token);
/// assert_eq!(tracker.active(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    active: AtomicUsize,
    idle: Notify,
}

impl ConnectionTracker {
    /// Creates a tracker with no open connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection. It stays open until the token is dropped.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of open connections.
    #[must_use]
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Waits until no connection is open.
    pub async fn wait_for_idle(&self) {
        loop {
            // Registered before the check so a release in between is not missed.
            let idle = self.inner.idle.notified();
            if self.active() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Keeps a connection counted by its [`ConnectionTracker`].
#[derive(Debug)]
pub struct ConnectionToken {
    inner: Arc<TrackerInner>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_signal_starts_untriggered() {
        let shutdown = ShutdownSignal::default();
        assert!(!shutdown.is_shutdown());
    }

    #[tokio::test]
    async fn test_recv_after_trigger_returns() {
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), shutdown.recv())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_trigger_wakes_every_clone() {
        let shutdown = ShutdownSignal::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = shutdown.clone();
                tokio::spawn(async move { signal.recv().await })
            })
            .collect();

        tokio::task::yield_now().await;
        shutdown.trigger();

        for waiter in waiters {
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .unwrap()
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_recv_pending_until_triggered() {
        let shutdown = ShutdownSignal::new();
        let result = tokio::time::timeout(Duration::from_millis(20), shutdown.recv()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_wait_for_idle_without_connections() {
        let tracker = ConnectionTracker::new();
        tokio::time::timeout(Duration::from_secs(1), tracker.wait_for_idle())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_idle_waits_for_last_token() {
        let tracker = ConnectionTracker::new();
        let first = tracker.acquire();
        let second = tracker.acquire();
        assert_eq!(tracker.active(), 2);

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.wait_for_idle().await })
        };

        drop(first);
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(second);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tracker.active(), 0);
    }

    #[test]
    fn test_token_moves_across_threads() {
        let tracker = ConnectionTracker::new();
        let token = tracker.acquire();
        std::thread::spawn(move || drop(token)).join().unwrap();
        assert_eq!(tracker.active(), 0);
    }
}
