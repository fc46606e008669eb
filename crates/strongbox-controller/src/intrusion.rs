//! Intrusion detection: door switch plus accelerometer.
//!
//! Movement is reported when any axis of a new sample differs from the
//! baseline by more than the configured sensitivity. The baseline follows
//! every quiet sample, so slow drift never trips the alarm, and is re-synced
//! explicitly when the alarm is cleared.
//!
//! Without a working accelerometer the monitor keeps running on the door
//! switch alone. A door switch that cannot be read counts as open.

use strongbox_core::{AccelSample, Error};
use strongbox_hardware::devices::{AnyDoorSensor, AnyMotionSensor};
use strongbox_hardware::{DoorSensor, MotionSensor};
use tracing::{debug, info, warn};

/// Which sensors a check consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensing {
    /// Door switch and accelerometer.
    Full,
    /// Door switch only.
    DoorOnly,
    /// Nothing; used while the alarm is already active.
    Off,
}

/// Intrusion monitor over a door switch and an optional accelerometer.
#[derive(Debug)]
pub struct IntrusionMonitor {
    door: AnyDoorSensor,
    motion: Option<AnyMotionSensor>,
    baseline: Option<AccelSample>,
    sensitivity: u32,
}

impl IntrusionMonitor {
    pub fn new(door: AnyDoorSensor, motion: AnyMotionSensor, sensitivity: u16) -> Self {
        Self {
            door,
            motion: Some(motion),
            baseline: None,
            sensitivity: u32::from(sensitivity),
        }
    }

    /// Initialise the accelerometer, degrading to door-only sensing if it
    /// does not respond.
    pub async fn initialize(&mut self) {
        let Some(motion) = self.motion.as_mut() else {
            return;
        };

        match motion.initialize().await {
            Ok(()) => {
                if let Ok(info) = motion.get_info().await {
                    info!(device = %info, "Accelerometer ready");
                }
            }
            Err(error) => self.degrade(error.into()),
        }
    }

    /// Whether the accelerometer has been dropped.
    pub fn is_degraded(&self) -> bool {
        self.motion.is_none()
    }

    /// Full check: door switch, then movement.
    pub async fn poll(&mut self) -> bool {
        if self.poll_door().await {
            return true;
        }
        self.poll_motion().await
    }

    /// Door-only check.
    pub async fn poll_door(&mut self) -> bool {
        match self.door.is_open().await {
            Ok(open) => {
                if open {
                    debug!("Door switch reports open");
                }
                open
            }
            Err(error) => {
                warn!(error = %error, "Door switch unreadable, treating door as open");
                true
            }
        }
    }

    /// Whether the door is closed. An unreadable switch counts as open.
    pub async fn door_closed(&mut self) -> bool {
        !self.poll_door().await
    }

    /// Run the check selected by `sensing`.
    pub async fn check(&mut self, sensing: Sensing) -> bool {
        match sensing {
            Sensing::Full => self.poll().await,
            Sensing::DoorOnly => self.poll_door().await,
            Sensing::Off => false,
        }
    }

    /// Take the current acceleration as the new baseline.
    pub async fn resync(&mut self) {
        self.baseline = None;
        if let Some(motion) = self.motion.as_mut() {
            match motion.sample().await {
                Ok(sample) => {
                    debug!(?sample, "Movement baseline re-synced");
                    self.baseline = Some(sample);
                }
                Err(error) => self.degrade(error.into()),
            }
        }
    }

    async fn poll_motion(&mut self) -> bool {
        let Some(motion) = self.motion.as_mut() else {
            return false;
        };

        let sample = match motion.sample().await {
            Ok(sample) => sample,
            Err(error) => {
                self.degrade(error.into());
                return false;
            }
        };

        let Some(baseline) = self.baseline else {
            self.baseline = Some(sample);
            return false;
        };

        let delta = sample.max_axis_delta(&baseline);
        if delta > self.sensitivity {
            warn!(delta, sensitivity = self.sensitivity, "Movement detected");
            return true;
        }

        self.baseline = Some(sample);
        false
    }

    fn degrade(&mut self, error: Error) {
        let error = match error {
            Error::SensorUnavailable(_) => error,
            other => Error::SensorUnavailable(other.to_string()),
        };
        warn!(error = %error, "Accelerometer dropped, continuing with door switch only");
        self.motion = None;
        self.baseline = None;
    }
}
