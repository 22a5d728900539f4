//! One-shot signals shared between listening threads and the render driver.
//!
//! A signal is a channel nobody ever sends on: closing it drops the only
//! sender, and every receiver, including those inside `select!`, observes
//! the disconnection at once.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::ProgressError;

/// Closed exactly once, when a component will produce no further changes.
#[derive(Debug, Clone)]
pub struct DoneSignal {
    tx: Arc<Mutex<Option<Sender<()>>>>,
    rx: Receiver<()>,
}

impl DoneSignal {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            rx,
        }
    }

    /// Close the signal. Closing twice does nothing.
    pub fn close(&self) {
        self.tx.lock().take();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// A receiver that disconnects when the signal closes.
    #[must_use]
    pub fn receiver(&self) -> Receiver<()> {
        self.rx.clone()
    }

    /// Block until the signal closes.
    pub fn wait(&self) {
        wait_closed(&self.rx);
    }
}

impl Default for DoneSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Block until a done receiver disconnects.
pub fn wait_closed(rx: &Receiver<()>) {
    while rx.recv().is_ok() {}
}

/// Cooperative cancellation shared by clones.
///
/// # Example
/// ```
/// use stackwatch_core::signal::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(token.check_cancelled().is_ok());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.check_cancelled().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    signal: DoneSignal,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.signal.close();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.signal.is_closed()
    }

    /// Check for cancellation, returning an error if cancelled.
    pub fn check_cancelled(&self) -> Result<(), ProgressError> {
        if self.is_cancelled() {
            Err(ProgressError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// A receiver that disconnects on cancellation, for use in `select!`.
    #[must_use]
    pub fn receiver(&self) -> Receiver<()> {
        self.signal.receiver()
    }
}
