//! File-backed EEPROM image.
//!
//! The simulated board keeps its EEPROM in a plain byte file so the
//! credential survives restarts. The whole image is held in memory; every
//! changed byte is written through to the file at its own offset.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use strongbox_hardware::mock::eeprom::ERASED_BYTE;
use strongbox_hardware::{EepromDevice, HardwareError, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info, warn};

/// EEPROM image stored in a file.
#[derive(Debug)]
pub struct FileEeprom {
    path: PathBuf,
    image: Vec<u8>,
}

impl FileEeprom {
    /// Open the image at `path`, creating an erased one if it does not exist.
    ///
    /// A shorter file is padded with erased bytes; a longer one is truncated
    /// to `capacity` in memory and left untouched on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or created.
    pub async fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let image = match fs::read(&path).await {
            Ok(mut bytes) => {
                if bytes.len() != capacity {
                    warn!(
                        path = %path.display(),
                        found = bytes.len(),
                        capacity,
                        "EEPROM image size mismatch, resizing"
                    );
                }
                bytes.resize(capacity, ERASED_BYTE);
                bytes
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), capacity, "Creating erased EEPROM image");
                let bytes = vec![ERASED_BYTE; capacity];
                fs::write(&path, &bytes).await?;
                bytes
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, image })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_through(&self, address: usize, value: u8) -> std::io::Result<()> {
        let mut file = OpenOptions::new().write(true).open(&self.path).await?;
        file.seek(SeekFrom::Start(address as u64)).await?;
        file.write_all(&[value]).await?;
        file.sync_data().await
    }

    fn check(&self, address: usize) -> Result<()> {
        if address >= self.image.len() {
            return Err(HardwareError::OutOfRange {
                address,
                capacity: self.image.len(),
            });
        }
        Ok(())
    }
}

impl EepromDevice for FileEeprom {
    fn capacity(&self) -> usize {
        self.image.len()
    }

    async fn read(&mut self, address: usize) -> Result<u8> {
        self.check(address)?;
        Ok(self.image[address])
    }

    async fn update(&mut self, address: usize, value: u8) -> Result<bool> {
        self.check(address)?;
        if self.image[address] == value {
            return Ok(false);
        }

        self.write_through(address, value)
            .await
            .map_err(|e| HardwareError::write_rejected(address, e.to_string()))?;
        self.image[address] = value;

        debug!(address, value, "EEPROM byte written");
        Ok(true)
    }
}
