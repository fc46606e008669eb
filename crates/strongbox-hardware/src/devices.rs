//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn DoorSensor>`
//! is not available. The controller is instead built over these enums, which
//! dispatch to a concrete device with a `match`. Physical drivers are added
//! as further variants, optionally behind a cargo feature.
//!
//! # Examples
//!
//! ```
//! use strongbox_hardware::devices::AnyKeypadDevice;
//! use strongbox_hardware::mock::MockKeypad;
//!
//! let (keypad, _handle) = MockKeypad::new();
//! let any_keypad = AnyKeypadDevice::Mock(keypad);
//! ```

use crate::mock::{
    MockDisplay, MockDoor, MockIndicator, MockKeypad, MockLock, MockMotion, MockSignals,
    MockTagReader,
};
use crate::traits::{
    ConsoleSignal, DisplayDevice, DoorSensor, IndicatorDevice, KeypadDevice, KeypadInput,
    LockActuator, MotionSensor, SignalSource, TagData, TagReader,
};
use crate::{DeviceInfo, Led, Result};
use strongbox_core::{AccelSample, LockPosition};

/// Enum wrapper for keypad dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyKeypadDevice {
    /// Mock keypad for development and testing.
    Mock(MockKeypad),
    // TODO: Add a GPIO matrix scanner variant once a Linux target board is chosen
}

impl KeypadDevice for AnyKeypadDevice {
    async fn poll_key(&mut self) -> Result<Option<KeypadInput>> {
        match self {
            Self::Mock(device) => device.poll_key().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for tag reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTagReader {
    /// Mock reader for development and testing.
    Mock(MockTagReader),
}

impl TagReader for AnyTagReader {
    async fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.initialize().await,
        }
    }

    async fn poll_tag(&mut self) -> Result<Option<TagData>> {
        match self {
            Self::Mock(device) => device.poll_tag().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for door switch dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDoorSensor {
    /// Mock door for development and testing.
    Mock(MockDoor),
}

impl DoorSensor for AnyDoorSensor {
    async fn is_open(&mut self) -> Result<bool> {
        match self {
            Self::Mock(device) => device.is_open().await,
        }
    }
}

/// Enum wrapper for accelerometer dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyMotionSensor {
    /// Mock accelerometer for development and testing.
    Mock(MockMotion),
}

impl MotionSensor for AnyMotionSensor {
    async fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.initialize().await,
        }
    }

    async fn sample(&mut self) -> Result<AccelSample> {
        match self {
            Self::Mock(device) => device.sample().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for lock actuator dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyLockActuator {
    /// Mock actuator for development and testing.
    Mock(MockLock),
}

impl LockActuator for AnyLockActuator {
    async fn set_position(&mut self, position: LockPosition) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_position(position).await,
        }
    }
}

/// Enum wrapper for display dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDisplayDevice {
    /// Mock display for development and testing.
    Mock(MockDisplay),
}

impl DisplayDevice for AnyDisplayDevice {
    fn size(&self) -> (usize, usize) {
        match self {
            Self::Mock(device) => device.size(),
        }
    }

    async fn clear(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.clear().await,
        }
    }

    async fn write_at(&mut self, line: usize, column: usize, text: &str) -> Result<()> {
        match self {
            Self::Mock(device) => device.write_at(line, column, text).await,
        }
    }

    async fn set_backlight(&mut self, enabled: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_backlight(enabled).await,
        }
    }
}

/// Enum wrapper for indicator dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyIndicatorDevice {
    /// Mock LEDs and buzzer for development and testing.
    Mock(MockIndicator),
}

impl IndicatorDevice for AnyIndicatorDevice {
    async fn set_led(&mut self, led: Led, on: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_led(led, on).await,
        }
    }

    async fn tone(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<()> {
        match self {
            Self::Mock(device) => device.tone(frequency_hz, duration_ms).await,
        }
    }

    async fn silence(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.silence().await,
        }
    }
}

/// Enum wrapper for console signal dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnySignalSource {
    /// Signals routed from the simulated console.
    Mock(MockSignals),
    /// Board without a console.
    Disabled,
}

impl SignalSource for AnySignalSource {
    async fn poll_signal(&mut self) -> Result<Option<ConsoleSignal>> {
        match self {
            Self::Mock(device) => device.poll_signal().await,
            Self::Disabled => Ok(None),
        }
    }
}
