//! Mock keypad implementation for testing and development.
//!
//! This module provides a simulated 4x3 keypad that can be controlled
//! programmatically for testing without requiring physical hardware.

use crate::{
    HardwareError, Result,
    traits::{KeypadDevice, KeypadInput},
    types::DeviceInfo,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Capacity of the simulated key buffer.
const KEY_BUFFER: usize = 64;

/// Mock keypad device for testing and development.
///
/// Key presses are queued through a [`MockKeypadHandle`] and handed out one
/// per [`poll_key`](KeypadDevice::poll_key) call. A dropped handle behaves
/// like a keypad nobody touches.
///
/// # Examples
///
/// ```
/// use strongbox_hardware::mock::MockKeypad;
/// use strongbox_hardware::traits::{KeypadDevice, KeypadInput};
///
/// #[tokio::main]
/// async fn main() -> strongbox_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     handle.send_input(KeypadInput::Digit(1)).await?;
///     handle.send_input(KeypadInput::Hash).await?;
///
///     assert_eq!(keypad.poll_key().await?, Some(KeypadInput::Digit(1)));
///     assert_eq!(keypad.poll_key().await?, Some(KeypadInput::Hash));
///     assert_eq!(keypad.poll_key().await?, None);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    /// Channel receiver for simulated key presses
    input_rx: mpsc::Receiver<KeypadInput>,

    /// Device name
    name: String,

    /// Matrix scan failing
    faulty: Arc<AtomicBool>,
}

impl MockKeypad {
    /// Create a new mock keypad with the default name.
    ///
    /// Returns a tuple of (MockKeypad, MockKeypadHandle) where the handle
    /// can be used to simulate key presses.
    pub fn new() -> (Self, MockKeypadHandle) {
        Self::with_name("Mock Keypad".to_string())
    }

    /// Create a new mock keypad with a custom name.
    pub fn with_name(name: String) -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(KEY_BUFFER);

        let faulty = Arc::new(AtomicBool::new(false));

        let keypad = Self {
            input_rx,
            name,
            faulty: Arc::clone(&faulty),
        };
        let handle = MockKeypadHandle { input_tx, faulty };

        (keypad, handle)
    }
}

impl Default for MockKeypad {
    fn default() -> Self {
        Self::new().0
    }
}

impl KeypadDevice for MockKeypad {
    async fn poll_key(&mut self) -> Result<Option<KeypadInput>> {
        if self.faulty.load(Ordering::SeqCst) {
            return Err(HardwareError::communication("keypad matrix scan failed"));
        }
        match self.input_rx.try_recv() {
            Ok(input) => Ok(Some(input)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock 4x3 Keypad").with_firmware_version("1.0.0"))
    }
}

/// Handle for controlling a mock keypad.
///
/// This handle can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    /// Channel sender for simulated key presses
    input_tx: mpsc::Sender<KeypadInput>,

    faulty: Arc<AtomicBool>,
}

impl MockKeypadHandle {
    /// Make every scan fail until cleared. Queued keys are kept.
    pub fn set_faulty(&self, faulty: bool) {
        self.faulty.store(faulty, Ordering::SeqCst);
    }

    /// Press one key.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn send_input(&self, input: KeypadInput) -> Result<()> {
        self.input_tx
            .send(input)
            .await
            .map_err(|_| HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Press a sequence of digit keys.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any digit is greater than 9
    /// - The keypad has been dropped and the channel is closed
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_hardware::mock::MockKeypad;
    ///
    /// #[tokio::main]
    /// async fn main() -> strongbox_hardware::Result<()> {
    ///     let (_keypad, handle) = MockKeypad::new();
    ///     handle.send_digits(&[1, 2, 3, 4, 5, 6]).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn send_digits(&self, digits: &[u8]) -> Result<()> {
        for &digit in digits {
            let input = KeypadInput::digit(digit)?;
            self.send_input(input).await?;
        }
        Ok(())
    }

    /// Type the keys named by `keys` (`0-9`, `*`, `#`), skipping anything else.
    ///
    /// Returns the number of keys pressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn type_keys(&self, keys: &str) -> Result<usize> {
        let mut pressed = 0;
        for input in keys.chars().filter_map(KeypadInput::from_char) {
            self.send_input(input).await?;
            pressed += 1;
        }
        Ok(pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_keypad_poll_is_non_blocking() {
        let (mut keypad, _handle) = MockKeypad::new();
        assert_eq!(keypad.poll_key().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mock_keypad_type_keys() {
        let (mut keypad, handle) = MockKeypad::new();

        let pressed = handle.type_keys("1a2*#").await.unwrap();
        assert_eq!(pressed, 4);

        let mut keys = Vec::new();
        while let Some(key) = keypad.poll_key().await.unwrap() {
            keys.push(key);
        }
        assert_eq!(
            keys,
            vec![
                KeypadInput::Digit(1),
                KeypadInput::Digit(2),
                KeypadInput::Star,
                KeypadInput::Hash
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_keypad_dropped_handle_reads_nothing() {
        let (mut keypad, handle) = MockKeypad::new();
        drop(handle);
        assert_eq!(keypad.poll_key().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mock_keypad_fault_keeps_queue() {
        let (mut keypad, handle) = MockKeypad::new();
        handle.type_keys("7").await.unwrap();
        handle.set_faulty(true);
        assert!(keypad.poll_key().await.is_err());

        handle.set_faulty(false);
        assert_eq!(keypad.poll_key().await.unwrap(), Some(KeypadInput::Digit(7)));
    }

    #[tokio::test]
    async fn test_mock_keypad_invalid_digit() {
        let (_keypad, handle) = MockKeypad::new();
        assert!(handle.send_digits(&[1, 12]).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_keypad_info() {
        let keypad = MockKeypad::default();
        let info = keypad.get_info().await.unwrap();
        assert_eq!(info.name, "Mock Keypad");
    }
}
