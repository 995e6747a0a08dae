//! Cancellable waits.
//!
//! Backoff and pacing sleeps can run into the minutes; a shutdown must not
//! have to wait them out. Every sleep in the pipeline goes through a
//! [`CancelToken`] so the caller can interrupt it mid-wait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::errors::FeedError;

/// Caller-supplied cancellation signal.
///
/// Cheap to clone; all clones observe the same signal. A default token is
/// never cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the signal. Idempotent; wakes every pending wait.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            // Register interest before re-checking, so a cancel() between
            // the check and the await is not lost.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Sleep for `duration`, returning early with [`FeedError::Cancelled`]
    /// if the token trips mid-wait.
    pub async fn sleep(&self, duration: Duration) -> Result<(), FeedError> {
        if self.is_cancelled() {
            return Err(FeedError::Cancelled);
        }
        if duration.is_zero() {
            return Ok(());
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.cancelled() => Err(FeedError::Cancelled),
        }
    }
}
