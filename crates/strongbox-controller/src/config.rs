//! Controller configuration with validation.
//!
//! Every field has a default equal to the firmware constant, so an empty
//! configuration file describes the reference device.
//!
//! ```toml
//! [tags]
//! open_tag = "4ae1c8a646984"
//! config_tag = "baaeb115"
//!
//! [intrusion]
//! movement_sensitivity = 1500
//!
//! [timing]
//! poll_interval_ms = 50
//! watchdog_timeout_ms = 8000
//!
//! [alarm]
//! tone_hz = 2000
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use strongbox_core::{Error, Result, TagRegistry, constants::*};

/// Main controller configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Distinguished tags
    pub tags: TagRegistry,
    /// Intrusion sensing
    pub intrusion: IntrusionConfig,
    /// Poll intervals, dwells and the watchdog
    pub timing: TimingConfig,
    /// Duress feedback while the alarm is active
    pub alarm: AlarmConfig,
}

impl ControllerConfig {
    /// Validate configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first offending field.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_controller::ControllerConfig;
    ///
    /// let mut config = ControllerConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.timing.unlock_dwell_ms = config.timing.watchdog_timeout_ms;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.tags.open_tag == self.tags.config_tag {
            return Err(Error::Config(
                "tags.open_tag and tags.config_tag must differ".into(),
            ));
        }

        if self.intrusion.movement_sensitivity == 0 {
            return Err(Error::Config(
                "intrusion.movement_sensitivity cannot be 0".into(),
            ));
        }

        let timing = &self.timing;
        if timing.watchdog_timeout_ms == 0 {
            return Err(Error::Config("timing.watchdog_timeout_ms cannot be 0".into()));
        }
        if timing.poll_interval_ms == 0 {
            return Err(Error::Config("timing.poll_interval_ms cannot be 0".into()));
        }
        if timing.alarm_blink_ms == 0 {
            return Err(Error::Config("timing.alarm_blink_ms cannot be 0".into()));
        }

        // Every wait that runs between two heartbeats must end before the
        // watchdog fires.
        for (name, value) in [
            ("poll_interval_ms", timing.poll_interval_ms),
            ("alarm_blink_ms", timing.alarm_blink_ms.saturating_mul(2)),
            ("unlock_dwell_ms", timing.unlock_dwell_ms),
            ("lock_dwell_ms", timing.lock_dwell_ms),
            ("lock_settle_ms", timing.lock_settle_ms),
            ("banner_ms", timing.banner_ms),
            ("alarm_cleared_ms", timing.alarm_cleared_ms),
            ("warning_ms", timing.warning_ms),
        ] {
            if value >= timing.watchdog_timeout_ms {
                return Err(Error::Config(format!(
                    "timing.{name} ({value}ms) must be shorter than the watchdog timeout ({}ms)",
                    timing.watchdog_timeout_ms
                )));
            }
        }

        if self.alarm.tone_hz == 0 {
            return Err(Error::Config("alarm.tone_hz cannot be 0".into()));
        }

        Ok(())
    }
}

/// Intrusion sensing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrusionConfig {
    /// Largest per-axis acceleration change (raw units) between two samples
    /// that is not reported as movement.
    pub movement_sensitivity: u16,
}

impl Default for IntrusionConfig {
    fn default() -> Self {
        Self {
            movement_sensitivity: DEFAULT_MOVEMENT_SENSITIVITY,
        }
    }
}

/// Timing configuration, all values in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub poll_interval_ms: u64,
    pub watchdog_timeout_ms: u64,
    pub unlock_dwell_ms: u64,
    pub lock_dwell_ms: u64,
    pub lock_settle_ms: u64,
    pub banner_ms: u64,
    pub alarm_cleared_ms: u64,
    pub warning_ms: u64,
    pub alarm_blink_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            watchdog_timeout_ms: DEFAULT_WATCHDOG_TIMEOUT_MS,
            unlock_dwell_ms: DEFAULT_UNLOCK_DWELL_MS,
            lock_dwell_ms: DEFAULT_LOCK_DWELL_MS,
            lock_settle_ms: DEFAULT_LOCK_SETTLE_MS,
            banner_ms: DEFAULT_BANNER_MS,
            alarm_cleared_ms: DEFAULT_ALARM_CLEARED_MS,
            warning_ms: DEFAULT_WARNING_MS,
            alarm_blink_ms: DEFAULT_ALARM_BLINK_MS,
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(self.watchdog_timeout_ms)
    }

    pub fn unlock_dwell(&self) -> Duration {
        Duration::from_millis(self.unlock_dwell_ms)
    }

    pub fn lock_dwell(&self) -> Duration {
        Duration::from_millis(self.lock_dwell_ms)
    }

    pub fn lock_settle(&self) -> Duration {
        Duration::from_millis(self.lock_settle_ms)
    }

    pub fn banner(&self) -> Duration {
        Duration::from_millis(self.banner_ms)
    }

    pub fn alarm_cleared(&self) -> Duration {
        Duration::from_millis(self.alarm_cleared_ms)
    }

    pub fn warning(&self) -> Duration {
        Duration::from_millis(self.warning_ms)
    }

    pub fn alarm_blink(&self) -> Duration {
        Duration::from_millis(self.alarm_blink_ms)
    }
}

/// Duress feedback configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Buzzer frequency
    pub tone_hz: u32,
    /// Length of each buzzer burst
    pub tone_ms: u32,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            tone_hz: DEFAULT_ALARM_TONE_HZ,
            tone_ms: DEFAULT_ALARM_TONE_MS,
        }
    }
}
