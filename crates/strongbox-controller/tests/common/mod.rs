//! Shared harness for controller integration tests.
//!
//! Builds a controller over the simulated board and an in-memory EEPROM
//! seeded with a credential record. Tests run on a paused clock, so every
//! dwell and poll interval completes instantly.
//!
//! Keys, tags and signals must be queued before the step that consumes
//! them; a PIN entry with an empty keypad never returns.

#![allow(dead_code)]

use strongbox_controller::{AccessController, ControllerConfig, Supervisor, WatchdogMonitor, watchdog};
use strongbox_core::constants::{DEFAULT_EEPROM_SIZE, EEPROM_TRIES_OFFSET};
use strongbox_core::{Mode, Pin};
use strongbox_hardware::ConsoleSignal;
use strongbox_hardware::board::{BoardHandles, Peripherals};
use strongbox_hardware::mock::{ERASED_BYTE, MockEeprom, MockEepromHandle};
use strongbox_storage::{AnyEeprom, CredentialStore};

/// UID of the default open tag (`4ae1c8a646984`).
pub const OPEN_TAG_UID: [u8; 7] = [0x4a, 0xe1, 0xc8, 0xa6, 0x46, 0x98, 0x04];

/// UID of the default config tag (`baaeb115`).
pub const CONFIG_TAG_UID: [u8; 4] = [0xba, 0xae, 0xb1, 0x15];

/// A booted controller with the handles of its board.
pub struct Vault {
    pub controller: AccessController,
    pub board: BoardHandles,
    pub eeprom: MockEepromHandle,
    pub monitor: WatchdogMonitor,
}

/// EEPROM image holding `pin` and `tries`.
pub fn image(pin: &str, tries: u8) -> Vec<u8> {
    let mut bytes = vec![ERASED_BYTE; DEFAULT_EEPROM_SIZE];
    bytes[..pin.len()].copy_from_slice(pin.as_bytes());
    bytes[EEPROM_TRIES_OFFSET] = tries;
    bytes
}

/// Controller booted on an EEPROM image.
pub async fn vault_with_image(image: Vec<u8>) -> Vault {
    let (peripherals, board) = Peripherals::simulated();
    let (eeprom, eeprom_handle) = MockEeprom::with_contents(image);
    let store = CredentialStore::new(AnyEeprom::Memory(eeprom)).unwrap();

    let config = ControllerConfig::default();
    let (heartbeat, monitor) = watchdog(config.timing.watchdog_timeout());
    let mut controller = AccessController::new(config, peripherals, store, heartbeat).unwrap();
    controller.boot().await;

    Vault {
        controller,
        board,
        eeprom: eeprom_handle,
        monitor,
    }
}

/// Controller booted with a stored credential.
pub async fn vault(pin: &str, tries: u8) -> Vault {
    vault_with_image(image(pin, tries)).await
}

/// Supervisor over a booted controller.
pub async fn supervised(pin: &str, tries: u8) -> (Supervisor, BoardHandles, MockEepromHandle) {
    let Vault {
        controller,
        board,
        eeprom,
        monitor,
    } = vault(pin, tries).await;
    (Supervisor::new(controller, monitor), board, eeprom)
}

impl Vault {
    /// Queue a console signal and let `Idle` consume it.
    pub async fn signal(&mut self, signal: ConsoleSignal) {
        self.board.signals.send(signal).await.unwrap();
        self.controller.step().await.unwrap();
    }

    /// Queue keys on the keypad.
    pub async fn keys(&self, keys: &str) {
        self.board.keypad.type_keys(keys).await.unwrap();
    }

    /// Enter one PIN attempt and run the step that reads it.
    pub async fn attempt(&mut self, pin: &str) -> Mode {
        self.keys(pin).await;
        self.controller.step().await.unwrap();
        self.controller.mode()
    }

    /// Authenticate into the settings menu with the stored PIN.
    pub async fn enter_settings(&mut self, pin: &str) {
        self.signal(ConsoleSignal::Config).await;
        assert_eq!(self.controller.mode(), Mode::Authenticating);
        self.attempt(pin).await;
    }

    /// Run steps until `mode` is reached, at most `limit` steps.
    pub async fn step_until(&mut self, mode: Mode, limit: usize) -> bool {
        for _ in 0..limit {
            if self.controller.mode() == mode {
                return true;
            }
            self.controller.step().await.unwrap();
        }
        self.controller.mode() == mode
    }

    /// Stored PIN bytes and tries byte.
    pub fn stored(&self) -> (Vec<u8>, u8) {
        let bytes = self.eeprom.bytes();
        (bytes[..EEPROM_TRIES_OFFSET].to_vec(), bytes[EEPROM_TRIES_OFFSET])
    }
}

pub fn pin(value: &str) -> Pin {
    Pin::new(value).unwrap()
}

/// Paused-clock runtime for property tests.
pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}
