//! Core constants for the Strongbox vault controller.
//!
//! This module centralises the persisted byte layout, credential defaults,
//! display geometry and the firmware timing values. Timing constants are
//! the defaults of `ControllerConfig`; deployments may override them.
//!
//! # Persisted Layout
//!
//! ```text
//! offset  0  1  2  3  4  5  6
//!        [P0 P1 P2 P3 P4 P5][T]
//! ```
//!
//! - `P0..P5` - PIN digits as ASCII bytes (`b'0'..=b'9'`)
//! - `T` - maximum PIN attempts before lockout (1-255)
//!
//! There is no version byte. Any change to this layout is a breaking change
//! for devices already in the field.

// ============================================================================
// Persisted Layout
// ============================================================================

/// EEPROM offset of the first PIN byte.
pub const EEPROM_PIN_BASE: usize = 0;

/// Number of PIN bytes stored.
pub const EEPROM_PIN_LEN: usize = PIN_LENGTH;

/// EEPROM offset of the tries byte, directly after the PIN.
pub const EEPROM_TRIES_OFFSET: usize = EEPROM_PIN_BASE + EEPROM_PIN_LEN;

/// Minimum EEPROM size able to hold the credential record.
///
/// # Examples
///
/// ```
/// use strongbox_core::constants::EEPROM_RECORD_LEN;
///
/// assert_eq!(EEPROM_RECORD_LEN, 7);
/// ```
pub const EEPROM_RECORD_LEN: usize = EEPROM_TRIES_OFFSET + 1;

/// Size of the EEPROM image used by the simulated board (ATmega328P size).
pub const DEFAULT_EEPROM_SIZE: usize = 1024;

// ============================================================================
// Credential
// ============================================================================

/// Exact number of digits in a PIN.
pub const PIN_LENGTH: usize = 6;

/// PIN substituted when the stored PIN bytes are unreadable.
pub const DEFAULT_PIN: &str = "000000";

/// Attempts substituted when the stored tries byte is corrupt.
pub const DEFAULT_MAX_TRIES: u8 = 3;

/// Number of key presses read by the change-tries entry.
pub const TRIES_ENTRY_DIGITS: usize = 2;

// ============================================================================
// Tags
// ============================================================================

/// Factory tag that opens the vault.
pub const DEFAULT_OPEN_TAG: &str = "4ae1c8a646984";

/// Factory tag that enters the settings menu.
pub const DEFAULT_CONFIG_TAG: &str = "baaeb115";

// ============================================================================
// Display
// ============================================================================

/// Character display line count.
pub const DISPLAY_LINES: usize = 2;

/// Character display column count.
pub const DISPLAY_COLUMNS: usize = 16;

/// First column of the echoed entry field (`     ------     `).
pub const ENTRY_FIELD_COLUMN: usize = 5;

// ============================================================================
// Intrusion
// ============================================================================

/// Largest per-axis acceleration delta (raw units) tolerated between two
/// consecutive samples.
pub const DEFAULT_MOVEMENT_SENSITIVITY: u16 = 1500;

// ============================================================================
// Timing (milliseconds)
// ============================================================================

/// Pause between two polls of an idle loop.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Watchdog grace period before the device restarts.
pub const DEFAULT_WATCHDOG_TIMEOUT_MS: u64 = 8000;

/// Time the bolt stays retracted before the door-closed watch starts.
pub const DEFAULT_UNLOCK_DWELL_MS: u64 = 5000;

/// Time the device stays inert after re-locking.
pub const DEFAULT_LOCK_DWELL_MS: u64 = 5000;

/// Delay between the `DOOR LOCKED` message and the actuator command.
pub const DEFAULT_LOCK_SETTLE_MS: u64 = 100;

/// Duration of menu banners (`SETTINGS MENU`, `EXITING SETTINGS`).
pub const DEFAULT_BANNER_MS: u64 = 3000;

/// Duration of the `ALARM DISABLED` confirmation.
pub const DEFAULT_ALARM_CLEARED_MS: u64 = 5000;

/// Duration of warnings such as `SAVE FAILED`.
pub const DEFAULT_WARNING_MS: u64 = 2000;

/// Half period of the duress blink while the alarm is active.
pub const DEFAULT_ALARM_BLINK_MS: u64 = 50;

/// Buzzer frequency while the alarm is active.
pub const DEFAULT_ALARM_TONE_HZ: u32 = 2000;

/// Length of each buzzer burst while the alarm is active.
pub const DEFAULT_ALARM_TONE_MS: u32 = 1000;
