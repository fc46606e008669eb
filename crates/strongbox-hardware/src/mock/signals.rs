//! Mock console signal source.

use crate::{
    HardwareError, Result,
    traits::{ConsoleSignal, SignalSource},
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Console signals queued by the router and consumed by the controller.
#[derive(Debug)]
pub struct MockSignals {
    signal_rx: mpsc::Receiver<ConsoleSignal>,
}

impl MockSignals {
    /// Create an empty signal queue and its sending handle.
    pub fn new() -> (Self, MockSignalsHandle) {
        let (signal_tx, signal_rx) = mpsc::channel(16);
        (Self { signal_rx }, MockSignalsHandle { signal_tx })
    }
}

impl SignalSource for MockSignals {
    async fn poll_signal(&mut self) -> Result<Option<ConsoleSignal>> {
        match self.signal_rx.try_recv() {
            Ok(signal) => Ok(Some(signal)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }
}

/// Handle for raising console signals.
#[derive(Debug, Clone)]
pub struct MockSignalsHandle {
    signal_tx: mpsc::Sender<ConsoleSignal>,
}

impl MockSignalsHandle {
    /// Queue a signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal source was dropped.
    pub async fn send(&self, signal: ConsoleSignal) -> Result<()> {
        self.signal_tx
            .send(signal)
            .await
            .map_err(|_| HardwareError::disconnected("Console signal channel closed"))
    }
}
