use strongbox_core::{
    CorruptField, Credential, Error, Pin, Result,
    constants::{
        DEFAULT_MAX_TRIES, EEPROM_PIN_BASE, EEPROM_PIN_LEN, EEPROM_RECORD_LEN, EEPROM_TRIES_OFFSET,
    },
};
use strongbox_hardware::EepromDevice;
use tracing::{debug, error, info, warn};

/// Raw credential bytes as found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawRecord {
    pin: [u8; EEPROM_PIN_LEN],
    tries: u8,
}

impl RawRecord {
    fn cell(&self, address: usize) -> u8 {
        if address == EEPROM_TRIES_OFFSET {
            self.tries
        } else {
            self.pin[address - EEPROM_PIN_BASE]
        }
    }
}

/// Persists the vault credential in EEPROM.
///
/// Writes use update semantics: a byte is only written when it differs from
/// the stored value, which spares EEPROM endurance and makes repeated saves
/// of the same credential free. A rejected write rolls back the bytes the
/// save already changed, so storage keeps the previous credential unless the
/// rollback itself is rejected.
#[derive(Debug)]
pub struct CredentialStore<E> {
    eeprom: E,
}

impl<E: EepromDevice> CredentialStore<E> {
    /// Wrap an EEPROM device.
    ///
    /// # Errors
    /// Returns `Error::Config` if the device cannot hold the credential record.
    pub fn new(eeprom: E) -> Result<Self> {
        if eeprom.capacity() < EEPROM_RECORD_LEN {
            return Err(Error::Config(format!(
                "EEPROM holds {} bytes, credential record needs {EEPROM_RECORD_LEN}",
                eeprom.capacity()
            )));
        }
        Ok(Self { eeprom })
    }

    /// Get a reference to the underlying device.
    pub fn device(&self) -> &E {
        &self.eeprom
    }

    async fn read_record(&mut self) -> Result<RawRecord> {
        let mut pin = [0u8; EEPROM_PIN_LEN];
        for (offset, byte) in pin.iter_mut().enumerate() {
            *byte = self.eeprom.read(EEPROM_PIN_BASE + offset).await?;
        }
        let tries = self.eeprom.read(EEPROM_TRIES_OFFSET).await?;

        Ok(RawRecord { pin, tries })
    }

    /// Load the stored credential.
    ///
    /// # Errors
    /// - `Error::StorageCorrupt` if a PIN byte is not an ASCII digit or the
    ///   attempt limit is zero
    /// - `Error::Hardware` if the device cannot be read
    pub async fn load(&mut self) -> Result<Credential> {
        let record = self.read_record().await?;

        if let Some(&raw) = record.pin.iter().find(|b| !b.is_ascii_digit()) {
            return Err(Error::StorageCorrupt {
                field: CorruptField::Pin,
                raw,
            });
        }
        if record.tries == 0 {
            return Err(Error::StorageCorrupt {
                field: CorruptField::MaxTries,
                raw: record.tries,
            });
        }

        Credential::new(Pin::from_bytes(&record.pin)?, record.tries)
    }

    /// Load the stored credential, substituting defaults for corrupt fields.
    ///
    /// Each field is recovered on its own: a corrupt attempt limit does not
    /// discard a valid PIN. Defaults are not written back; the next `save`
    /// persists whatever the user configures.
    pub async fn load_or_recover(&mut self) -> Credential {
        let record = match self.read_record().await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Credential unreadable, using factory defaults");
                return Credential::default();
            }
        };

        let pin = Pin::from_bytes(&record.pin).unwrap_or_else(|e| {
            warn!(error = %e, "Stored PIN corrupt, using default PIN");
            Pin::default()
        });

        let credential = Credential::default().with_pin(pin);
        match credential.with_max_tries(record.tries) {
            Ok(credential) => {
                info!(max_tries = credential.max_tries(), "Credential loaded");
                credential
            }
            Err(_) => {
                warn!(
                    raw = record.tries,
                    default = DEFAULT_MAX_TRIES,
                    "Stored attempt limit corrupt, using default"
                );
                credential
            }
        }
    }

    /// Persist a credential.
    ///
    /// Saving the credential that is already stored performs no writes.
    ///
    /// # Errors
    /// Returns `Error::StorageWriteError` if the medium rejects a write, after
    /// restoring the bytes already changed.
    pub async fn save(&mut self, credential: &Credential) -> Result<()> {
        let previous = self.read_record().await?;
        let cells = credential
            .pin()
            .as_bytes()
            .iter()
            .enumerate()
            .map(|(offset, &byte)| (EEPROM_PIN_BASE + offset, byte))
            .chain(std::iter::once((EEPROM_TRIES_OFFSET, credential.max_tries())));

        let mut written = Vec::with_capacity(EEPROM_RECORD_LEN);
        for (address, value) in cells {
            match self.eeprom.update(address, value).await {
                Ok(true) => written.push(address),
                Ok(false) => {}
                Err(e) => {
                    self.roll_back(&previous, &written).await;
                    return Err(e.into());
                }
            }
        }

        debug!(writes = written.len(), "Credential saved");
        Ok(())
    }

    async fn roll_back(&mut self, previous: &RawRecord, written: &[usize]) {
        for &address in written.iter().rev() {
            if let Err(e) = self.eeprom.update(address, previous.cell(address)).await {
                error!(address, error = %e, "Credential rollback failed, stored record is mixed");
                return;
            }
        }
        if !written.is_empty() {
            warn!(restored = written.len(), "Partial credential write rolled back");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strongbox_hardware::mock::{MockEeprom, MockEepromHandle};

    fn store_with(bytes: &[u8]) -> (CredentialStore<MockEeprom>, MockEepromHandle) {
        let mut image = vec![0xFF; 64];
        image[..bytes.len()].copy_from_slice(bytes);
        let (eeprom, handle) = MockEeprom::with_contents(image);
        (CredentialStore::new(eeprom).unwrap(), handle)
    }

    #[test]
    fn test_rejects_tiny_device() {
        let (eeprom, _handle) = MockEeprom::new(4);
        assert!(matches!(
            CredentialStore::new(eeprom),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_load_valid_record() {
        let (mut store, _handle) = store_with(b"123456\x05");
        let credential = store.load().await.unwrap();

        assert_eq!(credential.pin(), &Pin::new("123456").unwrap());
        assert_eq!(credential.max_tries(), 5);
    }

    #[tokio::test]
    async fn test_load_zero_tries_is_corrupt() {
        let (mut store, _handle) = store_with(b"123456\x00");
        assert!(matches!(
            store.load().await,
            Err(Error::StorageCorrupt {
                field: CorruptField::MaxTries,
                raw: 0
            })
        ));
    }

    #[tokio::test]
    async fn test_load_blank_eeprom_is_corrupt() {
        let (mut store, _handle) = store_with(&[]);
        assert!(matches!(
            store.load().await,
            Err(Error::StorageCorrupt {
                field: CorruptField::Pin,
                raw: 0xFF
            })
        ));
    }

    #[rstest]
    #[case(b"123456\x00", "123456", DEFAULT_MAX_TRIES)]
    #[case(b"12a456\x07", "000000", 7)]
    #[case(b"\xff\xff\xff\xff\xff\xff\x00", "000000", DEFAULT_MAX_TRIES)]
    #[case(b"654321\x09", "654321", 9)]
    #[tokio::test]
    async fn test_load_or_recover_field_by_field(
        #[case] bytes: &[u8],
        #[case] pin: &str,
        #[case] tries: u8,
    ) {
        let (mut store, handle) = store_with(bytes);
        let credential = store.load_or_recover().await;

        assert_eq!(credential.pin(), &Pin::new(pin).unwrap());
        assert_eq!(credential.max_tries(), tries);
        assert_eq!(handle.write_count(), 0);
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let (mut store, handle) = store_with(&[]);
        let credential = Credential::new(Pin::new("246810").unwrap(), 4).unwrap();

        store.save(&credential).await.unwrap();
        let first = handle.bytes();
        let writes = handle.write_count();

        store.save(&credential).await.unwrap();
        assert_eq!(handle.bytes(), first);
        assert_eq!(handle.write_count(), writes);
    }

    #[tokio::test]
    async fn test_save_only_writes_changed_bytes() {
        let (mut store, handle) = store_with(b"123456\x03");
        let credential = Credential::new(Pin::new("123450").unwrap(), 3).unwrap();

        store.save(&credential).await.unwrap();
        assert_eq!(handle.write_count(), 1);
    }

    #[tokio::test]
    async fn test_save_rejected_write() {
        let (mut store, handle) = store_with(b"123456\x03");
        handle.set_reject_writes(true);

        let credential = Credential::new(Pin::new("999999").unwrap(), 3).unwrap();
        assert!(matches!(
            store.save(&credential).await,
            Err(Error::StorageWriteError(_))
        ));
        assert_eq!(&handle.bytes()[..7], b"123456\x03");
    }

    #[rstest]
    #[case(2)]
    #[case(4)]
    #[case(6)]
    #[case(7)]
    #[tokio::test]
    async fn test_write_rejected_midway_restores_record(#[case] failing_write: usize) {
        let (mut store, handle) = store_with(b"123456\x03");
        handle.fail_nth_write(failing_write);

        let credential = Credential::new(Pin::new("999999").unwrap(), 5).unwrap();
        assert!(matches!(
            store.save(&credential).await,
            Err(Error::StorageWriteError(_))
        ));

        assert_eq!(&handle.bytes()[..7], b"123456\x03");
        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.pin(), &Pin::new("123456").unwrap());
        assert_eq!(reloaded.max_tries(), 3);
    }
}
