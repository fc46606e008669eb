//! Supervisor: runs the controller under the liveness watchdog.
//!
//! Every [`AccessController::step`] is raced against the
//! [`WatchdogMonitor`]. When the heartbeat stops, the step future is dropped
//! mid-flight and the controller restarts into `Idle`. A step that returns
//! an error is handled the same way.

use crate::controller::AccessController;
use crate::state_machine::ModeTransition;
use crate::watchdog::WatchdogMonitor;
use tracing::{error, warn};

/// Why the controller was restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// No heartbeat for the watchdog timeout.
    Watchdog,
    /// A step returned an error.
    StepFailed,
}

/// Outcome of one supervised step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Stepped(Option<ModeTransition>),
    Restarted(RestartReason),
}

/// Runs an [`AccessController`] under a watchdog.
#[derive(Debug)]
pub struct Supervisor {
    controller: AccessController,
    monitor: WatchdogMonitor,
    restarts: u32,
}

impl Supervisor {
    pub fn new(controller: AccessController, monitor: WatchdogMonitor) -> Self {
        Self {
            controller,
            monitor,
            restarts: 0,
        }
    }

    pub async fn boot(&mut self) {
        self.controller.boot().await;
    }

    /// Run one step, restarting the controller if it hangs or fails.
    pub async fn tick(&mut self) -> Tick {
        let outcome = tokio::select! {
            result = self.controller.step() => Ok(result),
            expired = self.monitor.expired() => Err(expired),
        };

        let reason = match outcome {
            Ok(Ok(transition)) => return Tick::Stepped(transition),
            Ok(Err(step_error)) => {
                error!(error = %step_error, mode = %self.controller.mode(), "Controller step failed");
                RestartReason::StepFailed
            }
            Err(expired) => {
                error!(error = %expired, mode = %self.controller.mode(), "Controller unresponsive");
                RestartReason::Watchdog
            }
        };

        self.restarts = self.restarts.saturating_add(1);
        warn!(?reason, restarts = self.restarts, "Restarting controller");
        self.controller.restart().await;
        Tick::Restarted(reason)
    }

    /// Supervise forever.
    pub async fn run(&mut self) {
        loop {
            self.tick().await;
        }
    }

    pub fn controller(&self) -> &AccessController {
        &self.controller
    }

    /// Number of restarts since construction.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}
