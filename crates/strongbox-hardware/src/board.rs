//! Peripheral set of one vault.
//!
//! [`Peripherals`] bundles one device of every kind the controller drives.
//! [`Peripherals::simulated`] builds the console-driven board out of mock
//! devices and returns the handles that feed and inspect it.

use crate::console::ConsoleRouter;
use crate::devices::{
    AnyDisplayDevice, AnyDoorSensor, AnyIndicatorDevice, AnyKeypadDevice, AnyLockActuator,
    AnyMotionSensor, AnySignalSource, AnyTagReader,
};
use crate::mock::{
    MockDisplay, MockDisplayHandle, MockDoor, MockDoorHandle, MockIndicator, MockIndicatorHandle,
    MockKeypad, MockKeypadHandle, MockLock, MockLockHandle, MockMotion, MockMotionHandle,
    MockSignals, MockSignalsHandle, MockTagReader, MockTagReaderHandle,
};

/// Every peripheral of a vault except its EEPROM, which belongs to the
/// credential store.
#[derive(Debug)]
pub struct Peripherals {
    pub keypad: AnyKeypadDevice,
    pub tag_reader: AnyTagReader,
    pub door: AnyDoorSensor,
    pub motion: AnyMotionSensor,
    pub lock: AnyLockActuator,
    pub display: AnyDisplayDevice,
    pub indicator: AnyIndicatorDevice,
    pub signals: AnySignalSource,
}

impl Peripherals {
    /// Build a simulated board from mock devices.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_hardware::board::Peripherals;
    ///
    /// let (peripherals, handles) = Peripherals::simulated();
    /// handles.door.open();
    /// let _console = handles.console();
    /// ```
    pub fn simulated() -> (Self, BoardHandles) {
        let (keypad, keypad_handle) = MockKeypad::new();
        let (tag_reader, tag_handle) = MockTagReader::new();
        let (door, door_handle) = MockDoor::new();
        let (motion, motion_handle) = MockMotion::new();
        let (lock, lock_handle) = MockLock::new();
        let (display, display_handle) = MockDisplay::new();
        let (indicator, indicator_handle) = MockIndicator::new();
        let (signals, signals_handle) = MockSignals::new();

        let peripherals = Self {
            keypad: AnyKeypadDevice::Mock(keypad),
            tag_reader: AnyTagReader::Mock(tag_reader),
            door: AnyDoorSensor::Mock(door),
            motion: AnyMotionSensor::Mock(motion),
            lock: AnyLockActuator::Mock(lock),
            display: AnyDisplayDevice::Mock(display),
            indicator: AnyIndicatorDevice::Mock(indicator),
            signals: AnySignalSource::Mock(signals),
        };

        let handles = BoardHandles {
            keypad: keypad_handle,
            tags: tag_handle,
            door: door_handle,
            motion: motion_handle,
            lock: lock_handle,
            display: display_handle,
            indicator: indicator_handle,
            signals: signals_handle,
        };

        (peripherals, handles)
    }
}

/// Handles of a simulated board.
#[derive(Debug, Clone)]
pub struct BoardHandles {
    pub keypad: MockKeypadHandle,
    pub tags: MockTagReaderHandle,
    pub door: MockDoorHandle,
    pub motion: MockMotionHandle,
    pub lock: MockLockHandle,
    pub display: MockDisplayHandle,
    pub indicator: MockIndicatorHandle,
    pub signals: MockSignalsHandle,
}

impl BoardHandles {
    /// Console router driving the input side of this board.
    pub fn console(&self) -> ConsoleRouter {
        ConsoleRouter::new(
            self.keypad.clone(),
            self.tags.clone(),
            self.door.clone(),
            self.motion.clone(),
            self.signals.clone(),
        )
    }
}
