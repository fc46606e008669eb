//! Liveness watchdog.
//!
//! The controller feeds a [`Heartbeat`] on every loop iteration and around
//! every dwell. The [`WatchdogMonitor`] resolves once no heartbeat has
//! arrived for the configured timeout, which the supervisor treats as a hung
//! controller.

use std::time::Duration;
use strongbox_core::Error;
use tokio::sync::watch;
use tokio::time::{Instant, timeout_at};
use tracing::{error, trace};

/// Create a connected heartbeat and monitor pair.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use strongbox_controller::watchdog;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (heartbeat, _monitor) = watchdog(Duration::from_secs(8));
/// heartbeat.feed();
/// # }
/// ```
pub fn watchdog(timeout: Duration) -> (Heartbeat, WatchdogMonitor) {
    let (tx, rx) = watch::channel(Instant::now());
    (Heartbeat { tx }, WatchdogMonitor { rx, timeout })
}

/// Feeding side of the watchdog.
#[derive(Debug)]
pub struct Heartbeat {
    tx: watch::Sender<Instant>,
}

impl Heartbeat {
    /// Record that the controller is alive.
    pub fn feed(&self) {
        self.tx.send_replace(Instant::now());
    }
}

/// Expiry side of the watchdog.
#[derive(Debug)]
pub struct WatchdogMonitor {
    rx: watch::Receiver<Instant>,
    timeout: Duration,
}

impl WatchdogMonitor {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait until the heartbeat has been silent for the timeout.
    ///
    /// Returns `Error::LivenessTimeout`. Never resolves once the heartbeat
    /// has been dropped.
    pub async fn expired(&mut self) -> Error {
        loop {
            let last = *self.rx.borrow_and_update();
            let deadline = last + self.timeout;

            match timeout_at(deadline, self.rx.changed()).await {
                Ok(Ok(())) => trace!("Heartbeat received"),
                Ok(Err(_)) => std::future::pending::<()>().await,
                Err(_) => {
                    let elapsed_ms =
                        u64::try_from(last.elapsed().as_millis()).unwrap_or(u64::MAX);
                    error!(elapsed_ms, "Watchdog expired");
                    return Error::LivenessTimeout { elapsed_ms };
                }
            }
        }
    }
}
