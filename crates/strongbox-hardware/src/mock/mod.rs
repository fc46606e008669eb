//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! programmatically without requiring physical hardware. Every constructor
//! returns the device together with a cloneable handle: input devices take
//! stimuli through the handle, output devices expose what they were told.

pub mod display;
pub mod door;
pub mod eeprom;
pub mod indicator;
pub mod keypad;
pub mod lock;
pub mod motion;
pub mod signals;
pub mod tag_reader;

// Re-export commonly used types
pub use display::{MockDisplay, MockDisplayHandle};
pub use door::{MockDoor, MockDoorHandle};
pub use eeprom::{ERASED_BYTE, MockEeprom, MockEepromHandle};
pub use indicator::{MockIndicator, MockIndicatorHandle};
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use lock::{MockLock, MockLockHandle};
pub use motion::{MockMotion, MockMotionHandle};
pub use signals::{MockSignals, MockSignalsHandle};
pub use tag_reader::{MockTagReader, MockTagReaderHandle};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock shared mock state, ignoring poisoning.
fn lock_state<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
