//! Mock bolt actuator.

use super::lock_state;
use crate::{HardwareError, Result, traits::LockActuator};
use std::sync::{Arc, Mutex};
use strongbox_core::LockPosition;

#[derive(Debug)]
struct LockState {
    position: LockPosition,
    commands: Vec<LockPosition>,
    stalled: bool,
    fail_next: bool,
}

/// Mock lock actuator that records every command it receives.
///
/// # Examples
///
/// ```
/// use strongbox_core::LockPosition;
/// use strongbox_hardware::mock::MockLock;
/// use strongbox_hardware::traits::LockActuator;
///
/// #[tokio::main]
/// async fn main() -> strongbox_hardware::Result<()> {
///     let (mut lock, handle) = MockLock::new();
///     lock.set_position(LockPosition::Unlocked).await?;
///     lock.set_position(LockPosition::Locked).await?;
///
///     assert_eq!(handle.position(), LockPosition::Locked);
///     assert_eq!(handle.count(LockPosition::Locked), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockLock {
    state: Arc<Mutex<LockState>>,
}

impl MockLock {
    /// Create a locked mock actuator and its inspection handle.
    pub fn new() -> (Self, MockLockHandle) {
        let state = Arc::new(Mutex::new(LockState {
            position: LockPosition::Locked,
            commands: Vec::new(),
            stalled: false,
            fail_next: false,
        }));

        let handle = MockLockHandle {
            state: Arc::clone(&state),
        };

        (Self { state }, handle)
    }
}

impl LockActuator for MockLock {
    async fn set_position(&mut self, position: LockPosition) -> Result<()> {
        let stalled = lock_state(&self.state).stalled;
        if stalled {
            // A jammed servo never acknowledges.
            std::future::pending::<()>().await;
        }

        let mut state = lock_state(&self.state);
        if state.fail_next {
            state.fail_next = false;
            return Err(HardwareError::communication("servo did not acknowledge"));
        }
        state.position = position;
        state.commands.push(position);
        Ok(())
    }
}

/// Handle for inspecting a mock lock.
#[derive(Debug, Clone)]
pub struct MockLockHandle {
    state: Arc<Mutex<LockState>>,
}

impl MockLockHandle {
    /// Position after the last command.
    pub fn position(&self) -> LockPosition {
        lock_state(&self.state).position
    }

    /// Every command received, oldest first.
    pub fn commands(&self) -> Vec<LockPosition> {
        lock_state(&self.state).commands.clone()
    }

    /// Make every following command hang forever, like a jammed servo.
    pub fn set_stalled(&self, stalled: bool) {
        lock_state(&self.state).stalled = stalled;
    }

    /// Reject the next command without moving the bolt.
    pub fn fail_next_command(&self) {
        lock_state(&self.state).fail_next = true;
    }

    /// Number of times `position` was commanded.
    pub fn count(&self, position: LockPosition) -> usize {
        lock_state(&self.state)
            .commands
            .iter()
            .filter(|&&commanded| commanded == position)
            .count()
    }
}
