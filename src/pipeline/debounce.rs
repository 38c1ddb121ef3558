//! Quiet-window debouncing for free-text input. The pipeline itself is
//! synchronous; this sits in front of it so only the last value typed
//! within the window triggers a recompute.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

pub struct Debouncer<T> {
    window: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Returns the debouncer and the receiver that settled values arrive on.
    /// Must be called inside a tokio runtime.
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                window,
                tx,
                pending: None,
            },
            rx,
        )
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Cancel whatever is pending and schedule `value`.
    pub fn push(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Receiver gone means nobody is listening any more
            let _ = tx.send(value);
        }));
    }

    /// Deliver `value` immediately, dropping anything pending.
    pub fn flush(&mut self, value: T) {
        self.cancel();
        let _ = self.tx.send(value);
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                trace!("debounce: superseded pending value");
            }
            handle.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
