//! Enum dispatch over the supported EEPROM backends.

use crate::file::FileEeprom;
use std::path::Path;
use strongbox_hardware::mock::{MockEeprom, MockEepromHandle};
use strongbox_hardware::{EepromDevice, Result};

/// Any EEPROM the credential store can sit on.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyEeprom {
    /// Volatile image, lost on exit.
    Memory(MockEeprom),
    /// Image persisted in a file.
    File(FileEeprom),
}

impl AnyEeprom {
    /// Open a file-backed image when `path` is given, otherwise an erased
    /// in-memory one.
    ///
    /// The handle is only returned for in-memory images.
    ///
    /// # Errors
    ///
    /// Returns an error if the image file cannot be opened or created.
    pub async fn open(
        path: Option<&Path>,
        capacity: usize,
    ) -> Result<(Self, Option<MockEepromHandle>)> {
        match path {
            Some(path) => Ok((Self::File(FileEeprom::open(path, capacity).await?), None)),
            None => {
                let (eeprom, handle) = MockEeprom::new(capacity);
                Ok((Self::Memory(eeprom), Some(handle)))
            }
        }
    }
}

impl EepromDevice for AnyEeprom {
    fn capacity(&self) -> usize {
        match self {
            Self::Memory(device) => device.capacity(),
            Self::File(device) => device.capacity(),
        }
    }

    async fn read(&mut self, address: usize) -> Result<u8> {
        match self {
            Self::Memory(device) => device.read(address).await,
            Self::File(device) => device.read(address).await,
        }
    }

    async fn update(&mut self, address: usize, value: u8) -> Result<bool> {
        match self {
            Self::Memory(device) => device.update(address, value).await,
            Self::File(device) => device.update(address, value).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_without_path_is_in_memory() {
        let (eeprom, handle) = AnyEeprom::open(None, 64).await.unwrap();
        assert!(matches!(eeprom, AnyEeprom::Memory(_)));
        assert!(handle.is_some());
        assert_eq!(eeprom.capacity(), 64);
    }

    #[tokio::test]
    async fn test_open_with_path_is_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.eeprom");

        let (eeprom, handle) = AnyEeprom::open(Some(&path), 64).await.unwrap();
        assert!(matches!(eeprom, AnyEeprom::File(_)));
        assert!(handle.is_none());
        assert!(path.exists());
    }
}
