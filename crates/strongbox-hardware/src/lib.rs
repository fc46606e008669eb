//! Peripheral abstraction layer for the Strongbox vault controller.
//!
//! This crate provides:
//! - Capability traits for every vault peripheral ([`traits`])
//! - Enum wrappers for concrete dispatch ([`devices`])
//! - Mock devices with control handles ([`mock`])
//! - The simulated board and its line console ([`board`], [`console`])
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ AccessController     │
//! └──────────┬───────────┘
//!            │ Peripherals (Any* enums)
//! ┌──────────┴───────────┐        ┌────────────────┐
//! │ Mock devices         │◄───────│ ConsoleRouter  │◄── stdin / serial
//! └──────────────────────┘ handles└────────────────┘
//! ```
//!
//! # Features
//!
//! - `hardware-serial`: read the console from a serial port

pub mod board;
pub mod console;
pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use traits::{
    ConsoleSignal, DisplayDevice, DoorSensor, EepromDevice, IndicatorDevice, KeypadDevice,
    KeypadInput, LockActuator, MotionSensor, SignalSource, TagData, TagReader,
};
pub use types::{DeviceInfo, Led};
