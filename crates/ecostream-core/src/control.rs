//! Cooperative shutdown signal shared by the loops.
//!
//! The flag is an [`AtomicBool`] so loops can check it without locking.
//! A [`Notify`] wakes any loop that is sleeping between ticks, so a
//! shutdown request takes effect at the next suspension point instead of
//! after the full interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Shutdown flag plus wake-up notification.
///
/// Wrap in [`Arc`](std::sync::Arc) to share between the loop tasks, the
/// HTTP server, and the signal handler.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownSignal {
    /// Create a signal in the running state.
    pub fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Request shutdown and wake every sleeping loop.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Check whether shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Sleep for `duration` unless shutdown is requested first.
    ///
    /// Returns `true` if the full interval elapsed and the loop should
    /// continue, `false` if shutdown was requested.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent `request`
        // cannot slip between the check and the wait.
        notified.as_mut().enable();
        if self.is_requested() {
            return false;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => !self.is_requested(),
            () = &mut notified => false,
        }
    }

    /// Wait until shutdown is requested.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_requested() {
                return;
            }
            notified.await;
        }
    }
}
