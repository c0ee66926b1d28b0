//! Debounced value gating.
//!
//! Owns its own cancellable delayed task rather than piggybacking on a UI
//! re-render cycle, so it is testable under a paused clock with no view
//! harness.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Gates a rapidly-changing input value: a value is committed to the output
/// channel only once it has been stable for the configured delay.
///
/// Every `input` cancels the pending commit and schedules a new one; equal
/// consecutive values still reset the timer. No side effects beyond the
/// channel send.
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver its commits are delivered on.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                tx,
                pending: None,
            },
            rx,
        )
    }

    /// Feed a new raw value, resetting the quiet-period timer.
    pub fn input(&mut self, value: T) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(value);
        }));
    }

    /// Cancel the pending commit, if any, without feeding a new value.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        // No late commit may fire after teardown.
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
