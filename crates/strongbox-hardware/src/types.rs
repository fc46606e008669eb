//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic device information.
///
/// Contains metadata about a hardware device such as name, model and
/// firmware version. Logged once at boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "MFRC522", "Mock Keypad").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.firmware_version {
            Some(version) => write!(f, "{} ({}, fw {})", self.name, self.model, version),
            None => write!(f, "{} ({})", self.name, self.model),
        }
    }
}

/// Discrete status LEDs on the vault front panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Led {
    /// Alarm LED.
    Red,

    /// Door unlocked LED.
    Green,
}

impl fmt::Display for Led {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
        }
    }
}
