use std::fmt;

use thiserror::Error;

/// Persisted field that failed validation on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptField {
    /// One of the six PIN bytes is not an ASCII digit.
    Pin,
    /// The tries byte is zero.
    MaxTries,
}

impl fmt::Display for CorruptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptField::Pin => write!(f, "pin"),
            CorruptField::MaxTries => write!(f, "max_tries"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    // Storage errors
    #[error("Stored {field} is corrupt (raw byte 0x{raw:02x})")]
    StorageCorrupt { field: CorruptField, raw: u8 },

    #[error("Storage write failed: {0}")]
    StorageWriteError(String),

    // Sensing errors
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("Liveness watchdog expired after {elapsed_ms}ms without heartbeat")]
    LivenessTimeout { elapsed_ms: u64 },

    // Validation errors
    #[error("Invalid PIN: {0}")]
    InvalidPin(String),

    #[error("Invalid tries count: {0} (must be at least 1)")]
    InvalidTries(u8),

    #[error("Invalid tag identifier: {0}")]
    InvalidTag(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Hardware errors
    #[error("Hardware operation failed: {0}")]
    Hardware(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_corrupt_display() {
        let error = Error::StorageCorrupt {
            field: CorruptField::MaxTries,
            raw: 0,
        };
        assert_eq!(error.to_string(), "Stored max_tries is corrupt (raw byte 0x00)");
    }

    #[test]
    fn test_liveness_timeout_display() {
        let error = Error::LivenessTimeout { elapsed_ms: 8000 };
        assert_eq!(
            error.to_string(),
            "Liveness watchdog expired after 8000ms without heartbeat"
        );
    }
}
