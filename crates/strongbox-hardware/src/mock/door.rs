//! Mock door position switch.

use crate::{HardwareError, Result, traits::DoorSensor};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Mock door switch. The door starts closed.
///
/// # Examples
///
/// ```
/// use strongbox_hardware::mock::MockDoor;
/// use strongbox_hardware::traits::DoorSensor;
///
/// #[tokio::main]
/// async fn main() -> strongbox_hardware::Result<()> {
///     let (mut door, handle) = MockDoor::new();
///     assert!(!door.is_open().await?);
///
///     handle.open();
///     assert!(door.is_open().await?);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDoor {
    open: Arc<AtomicBool>,
    faulty: Arc<AtomicBool>,
}

impl MockDoor {
    /// Create a closed mock door and its control handle.
    pub fn new() -> (Self, MockDoorHandle) {
        let open = Arc::new(AtomicBool::new(false));
        let faulty = Arc::new(AtomicBool::new(false));

        let handle = MockDoorHandle {
            open: Arc::clone(&open),
            faulty: Arc::clone(&faulty),
        };

        (Self { open, faulty }, handle)
    }
}

impl DoorSensor for MockDoor {
    async fn is_open(&mut self) -> Result<bool> {
        if self.faulty.load(Ordering::SeqCst) {
            return Err(HardwareError::communication("door switch line floating"));
        }
        Ok(self.open.load(Ordering::SeqCst))
    }
}

/// Handle for moving the mock door.
#[derive(Debug, Clone)]
pub struct MockDoorHandle {
    open: Arc<AtomicBool>,
    faulty: Arc<AtomicBool>,
}

impl MockDoorHandle {
    /// Swing the door open.
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    /// Push the door shut.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Current door position.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Make every read fail until cleared.
    pub fn set_faulty(&self, faulty: bool) {
        self.faulty.store(faulty, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_door_open_close() {
        let (mut door, handle) = MockDoor::new();
        handle.open();
        assert!(door.is_open().await.unwrap());
        handle.close();
        assert!(!door.is_open().await.unwrap());
    }

    #[tokio::test]
    async fn test_faulty_door_errors() {
        let (mut door, handle) = MockDoor::new();
        handle.set_faulty(true);
        assert!(door.is_open().await.is_err());
    }
}
