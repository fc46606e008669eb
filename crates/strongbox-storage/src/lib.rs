//! Credential persistence for the Strongbox vault controller.
//!
//! The credential lives in seven EEPROM bytes: six ASCII PIN digits at
//! offset 0 followed by the attempt limit at offset 6. This crate provides:
//!
//! - [`CredentialStore`] - load, recover and save the credential record
//! - [`FileEeprom`] - an EEPROM image kept in a file, for the simulated board
//! - [`AnyEeprom`] - enum dispatch over the supported EEPROM backends
//!
//! # Examples
//!
//! ```
//! use strongbox_core::{Credential, Pin};
//! use strongbox_hardware::mock::MockEeprom;
//! use strongbox_storage::CredentialStore;
//!
//! # #[tokio::main]
//! # async fn main() -> strongbox_core::Result<()> {
//! let (eeprom, _handle) = MockEeprom::new(1024);
//! let mut store = CredentialStore::new(eeprom)?;
//!
//! let credential = Credential::new(Pin::new("123456")?, 3)?;
//! store.save(&credential).await?;
//! assert_eq!(store.load().await?, credential);
//! # Ok(())
//! # }
//! ```

pub mod eeprom;
pub mod file;
pub mod store;

pub use eeprom::AnyEeprom;
pub use file::FileEeprom;
pub use store::CredentialStore;
