//! In-memory EEPROM.

use super::lock_state;
use crate::{HardwareError, Result, traits::EepromDevice};
use std::sync::{Arc, Mutex};

/// Value of an erased EEPROM cell.
pub const ERASED_BYTE: u8 = 0xFF;

#[derive(Debug)]
struct EepromState {
    bytes: Vec<u8>,
    writes: usize,
    reject_writes: bool,
    /// Changing writes left before a single one is rejected.
    fail_in: Option<usize>,
}

/// In-memory EEPROM that counts physical writes.
///
/// A fresh device is erased (every byte `0xFF`), like a new ATmega part.
///
/// # Examples
///
/// ```
/// use strongbox_hardware::mock::MockEeprom;
/// use strongbox_hardware::traits::EepromDevice;
///
/// #[tokio::main]
/// async fn main() -> strongbox_hardware::Result<()> {
///     let (mut eeprom, handle) = MockEeprom::new(1024);
///
///     assert!(eeprom.update(6, 3).await?);
///     assert!(!eeprom.update(6, 3).await?);
///     assert_eq!(handle.write_count(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockEeprom {
    state: Arc<Mutex<EepromState>>,
    capacity: usize,
}

impl MockEeprom {
    /// Create an erased EEPROM of `capacity` bytes.
    pub fn new(capacity: usize) -> (Self, MockEepromHandle) {
        Self::with_contents(vec![ERASED_BYTE; capacity])
    }

    /// Create an EEPROM holding `bytes`.
    pub fn with_contents(bytes: Vec<u8>) -> (Self, MockEepromHandle) {
        let capacity = bytes.len();
        let state = Arc::new(Mutex::new(EepromState {
            bytes,
            writes: 0,
            reject_writes: false,
            fail_in: None,
        }));

        let handle = MockEepromHandle {
            state: Arc::clone(&state),
        };

        (Self { state, capacity }, handle)
    }

    fn check(&self, address: usize) -> Result<()> {
        if address >= self.capacity {
            return Err(HardwareError::OutOfRange {
                address,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl EepromDevice for MockEeprom {
    fn capacity(&self) -> usize {
        self.capacity
    }

    async fn read(&mut self, address: usize) -> Result<u8> {
        self.check(address)?;
        Ok(lock_state(&self.state).bytes[address])
    }

    async fn update(&mut self, address: usize, value: u8) -> Result<bool> {
        self.check(address)?;

        let mut state = lock_state(&self.state);
        if state.bytes[address] == value {
            return Ok(false);
        }
        if state.reject_writes {
            return Err(HardwareError::write_rejected(address, "cell did not verify"));
        }
        match state.fail_in {
            Some(0 | 1) => {
                state.fail_in = None;
                return Err(HardwareError::write_rejected(address, "cell did not verify"));
            }
            Some(left) => state.fail_in = Some(left - 1),
            None => {}
        }

        state.bytes[address] = value;
        state.writes += 1;
        Ok(true)
    }
}

/// Handle for inspecting and tampering with a mock EEPROM.
#[derive(Debug, Clone)]
pub struct MockEepromHandle {
    state: Arc<Mutex<EepromState>>,
}

impl MockEepromHandle {
    /// Copy of the whole image.
    pub fn bytes(&self) -> Vec<u8> {
        lock_state(&self.state).bytes.clone()
    }

    /// Number of physical byte writes so far.
    pub fn write_count(&self) -> usize {
        lock_state(&self.state).writes
    }

    /// Make every changing write fail until cleared.
    pub fn set_reject_writes(&self, reject: bool) {
        lock_state(&self.state).reject_writes = reject;
    }

    /// Reject only the `n`th changing write from now on (1-based); the writes
    /// before and after it succeed.
    pub fn fail_nth_write(&self, n: usize) {
        lock_state(&self.state).fail_in = Some(n);
    }

    /// Overwrite a byte behind the device's back. Out-of-range writes are ignored.
    pub fn poke(&self, address: usize, value: u8) {
        if let Some(byte) = lock_state(&self.state).bytes.get_mut(address) {
            *byte = value;
        }
    }
}
