//! Hardware device trait definitions.
//!
//! This module defines the capability interfaces between the vault
//! controller and its peripherals: keypad, tag reader, door switch,
//! accelerometer, lock actuator, character display, indicators, EEPROM and
//! the console signal source of the simulated board. The controller only
//! talks to these traits, so the same decision logic runs on the simulated
//! board and on physical drivers.
//!
//! Input traits are non-blocking polls (`poll_*`). The controller owns the
//! waiting: it polls in a loop and interleaves intrusion checks and the
//! watchdog heartbeat between polls.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::{HardwareError, Result};
use crate::types::{DeviceInfo, Led};
use strongbox_core::{AccelSample, LockPosition, TagId};

/// Key pressed on the 4x3 vault keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypadInput {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Star key (*), "OK" in the settings menu.
    Star,

    /// Hash key (#), "NEXT" in the settings menu.
    Hash,
}

impl KeypadInput {
    /// Create a digit input.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_hardware::traits::KeypadInput;
    ///
    /// let input = KeypadInput::digit(5).unwrap();
    /// assert_eq!(input.as_digit(), Some(5));
    ///
    /// assert!(KeypadInput::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(HardwareError::invalid_data(format!(
                "Digit must be 0-9, got {}",
                d
            )));
        }
        Ok(Self::Digit(d))
    }

    /// Map a keypad legend character to its key.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_hardware::traits::KeypadInput;
    ///
    /// assert_eq!(KeypadInput::from_char('7'), Some(KeypadInput::Digit(7)));
    /// assert_eq!(KeypadInput::from_char('#'), Some(KeypadInput::Hash));
    /// assert_eq!(KeypadInput::from_char('A'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(Self::Star),
            '#' => Some(Self::Hash),
            _ => c
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .map(Self::Digit),
        }
    }

    /// Legend printed on the key.
    pub fn as_char(&self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d),
            Self::Star => '*',
            Self::Hash => '#',
        }
    }

    /// Check if this input is a digit.
    pub fn is_digit(&self) -> bool {
        matches!(self, Self::Digit(_))
    }

    /// Get the digit value if this is a digit input.
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }
}

/// Keypad device abstraction.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or the enum wrappers from the
/// [`devices`](crate::devices) module for concrete dispatch.
///
/// # Examples
///
/// ```no_run
/// use strongbox_hardware::traits::{KeypadDevice, KeypadInput};
/// use strongbox_hardware::error::Result;
///
/// async fn wait_for_hash<K: KeypadDevice>(keypad: &mut K) -> Result<()> {
///     loop {
///         if keypad.poll_key().await? == Some(KeypadInput::Hash) {
///             return Ok(());
///         }
///         tokio::time::sleep(std::time::Duration::from_millis(50)).await;
///     }
/// }
/// ```
pub trait KeypadDevice: Send + Sync {
    /// Return the next pending key press, or `None` when no key is down.
    ///
    /// This never waits for a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn poll_key(&mut self) -> Result<Option<KeypadInput>>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be queried.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Minimum UID length in bytes (per ISO 14443 specification).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum UID length in bytes (per ISO 14443 specification).
pub const MAX_UID_LENGTH: usize = 10;

/// Tag read by the proximity reader.
#[derive(Debug, Clone)]
pub struct TagData {
    /// Tag unique identifier (4-10 bytes).
    pub uid: Vec<u8>,

    /// Timestamp when the tag was read.
    pub read_at: chrono::DateTime<chrono::Utc>,
}

impl TagData {
    /// Create tag data with the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is outside 4-10 bytes.
    pub fn new(uid: Vec<u8>) -> Result<Self> {
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&uid.len()) {
            return Err(HardwareError::invalid_data(format!(
                "UID length must be {}-{} bytes, got {}",
                MIN_UID_LENGTH,
                MAX_UID_LENGTH,
                uid.len()
            )));
        }

        Ok(Self {
            uid,
            read_at: chrono::Utc::now(),
        })
    }

    /// Identifier in the form the tag registry stores.
    pub fn tag_id(&self) -> TagId {
        TagId::from_uid(&self.uid)
    }
}

/// Proximity tag reader abstraction.
pub trait TagReader: Send + Sync {
    /// Bring up the reader (bus and antenna).
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not answer.
    async fn initialize(&mut self) -> Result<()>;

    /// Return the tag currently in the field, or `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag cannot be read.
    async fn poll_tag(&mut self) -> Result<Option<TagData>>;

    /// Get reader information.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader cannot be queried.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Door position switch.
pub trait DoorSensor: Send + Sync {
    /// Whether the door is currently open.
    ///
    /// # Errors
    ///
    /// Returns an error if the switch cannot be read.
    async fn is_open(&mut self) -> Result<bool>;
}

/// Triaxial accelerometer used for tamper detection.
pub trait MotionSensor: Send + Sync {
    /// Initialise the sensor and verify the connection.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InitializationFailed`] if the sensor does
    /// not respond.
    async fn initialize(&mut self) -> Result<()>;

    /// Read the current acceleration.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample cannot be read.
    async fn sample(&mut self) -> Result<AccelSample>;

    /// Get sensor information.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor cannot be queried.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Bolt actuator.
pub trait LockActuator: Send + Sync {
    /// Drive the bolt to the given position.
    ///
    /// Completion is not signalled; callers dwell for a fixed time afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be delivered.
    async fn set_position(&mut self, position: LockPosition) -> Result<()>;
}

/// Character display (2 lines x 16 columns on the reference board).
pub trait DisplayDevice: Send + Sync {
    /// Number of (lines, columns).
    fn size(&self) -> (usize, usize);

    /// Blank every cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the display does not acknowledge.
    async fn clear(&mut self) -> Result<()>;

    /// Write text starting at the given cell. Text past the last column is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is outside the display.
    async fn write_at(&mut self, line: usize, column: usize, text: &str) -> Result<()>;

    /// Switch the backlight.
    ///
    /// # Errors
    ///
    /// Returns an error if the display does not acknowledge.
    async fn set_backlight(&mut self, enabled: bool) -> Result<()>;
}

/// Discrete LEDs and buzzer.
pub trait IndicatorDevice: Send + Sync {
    /// Switch one LED.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be driven.
    async fn set_led(&mut self, led: Led, on: bool) -> Result<()>;

    /// Start a buzzer tone; it stops by itself after `duration_ms`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be driven.
    async fn tone(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<()>;

    /// Stop the buzzer immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be driven.
    async fn silence(&mut self) -> Result<()>;
}

/// Byte-addressable non-volatile memory.
pub trait EepromDevice: Send + Sync {
    /// Number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is out of range or the medium fails.
    async fn read(&mut self, address: usize) -> Result<u8>;

    /// Write one byte only if it differs from the stored value.
    ///
    /// Returns `true` when a physical write happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is out of range or the medium
    /// rejects the write.
    async fn update(&mut self, address: usize, value: u8) -> Result<bool>;
}

/// External signal typed on the maintenance console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleSignal {
    /// `opn`: request an unlock, as if the open tag was scanned.
    Open,
    /// `cfg`: request the settings menu, as if the config tag was scanned.
    Config,
    /// `mov`: report movement, as if the accelerometer tripped.
    Movement,
}

impl ConsoleSignal {
    /// Parse a console command word.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_hardware::traits::ConsoleSignal;
    ///
    /// assert_eq!(ConsoleSignal::parse("opn"), Some(ConsoleSignal::Open));
    /// assert_eq!(ConsoleSignal::parse(" cfg "), Some(ConsoleSignal::Config));
    /// assert_eq!(ConsoleSignal::parse("open"), None);
    /// ```
    pub fn parse(word: &str) -> Option<Self> {
        match word.trim() {
            "opn" => Some(Self::Open),
            "cfg" => Some(Self::Config),
            "mov" => Some(Self::Movement),
            _ => None,
        }
    }
}

/// Source of console signals.
pub trait SignalSource: Send + Sync {
    /// Return the next pending signal, or `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the console link failed.
    async fn poll_signal(&mut self) -> Result<Option<ConsoleSignal>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_input_digit() {
        for d in 0..=9 {
            let input = KeypadInput::digit(d).unwrap();
            assert_eq!(input.as_digit(), Some(d));
            assert!(input.is_digit());
        }
    }

    #[test]
    fn test_keypad_input_invalid_digit() {
        assert!(KeypadInput::digit(10).is_err());
        assert!(KeypadInput::digit(255).is_err());
    }

    #[test]
    fn test_keypad_input_char_roundtrip() {
        for c in "0123456789*#".chars() {
            let input = KeypadInput::from_char(c).unwrap();
            assert_eq!(input.as_char(), c);
        }
        assert!(!KeypadInput::Star.is_digit());
    }

    #[test]
    fn test_tag_data_uid_length() {
        assert!(TagData::new(vec![0x01, 0x02, 0x03]).is_err());
        assert!(TagData::new(vec![0x00; 11]).is_err());
        assert!(TagData::new(vec![0x01, 0x02, 0x03, 0x04]).is_ok());
    }

    #[test]
    fn test_tag_data_tag_id() {
        let tag = TagData::new(vec![0xba, 0xae, 0xb1, 0x15]).unwrap();
        assert_eq!(tag.tag_id().as_str(), "baaeb115");
    }

    #[test]
    fn test_console_signal_parse() {
        assert_eq!(ConsoleSignal::parse("mov"), Some(ConsoleSignal::Movement));
        assert_eq!(ConsoleSignal::parse("MOV"), None);
        assert_eq!(ConsoleSignal::parse(""), None);
    }
}
