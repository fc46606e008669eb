//! Error types for hardware operations.
//!
//! Peripheral failures. Converted into [`strongbox_core::Error`] at the
//! controller boundary, where rejected writes become storage errors and
//! failed initialisation becomes an unavailable sensor.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Address outside the device.
    #[error("Address {address} out of range (capacity {capacity})")]
    OutOfRange { address: usize, capacity: usize },

    /// The medium refused a write.
    #[error("Write rejected at address {address}: {message}")]
    WriteRejected { address: usize, message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new rejected write error.
    pub fn write_rejected(address: usize, message: impl Into<String>) -> Self {
        Self::WriteRejected {
            address,
            message: message.into(),
        }
    }
}

impl From<HardwareError> for strongbox_core::Error {
    fn from(error: HardwareError) -> Self {
        match error {
            HardwareError::WriteRejected { .. } => Self::StorageWriteError(error.to_string()),
            HardwareError::InitializationFailed { .. } => Self::SensorUnavailable(error.to_string()),
            HardwareError::Io(io) => Self::Io(io),
            other => Self::Hardware(other.to_string()),
        }
    }
}
