//! Mock accelerometer.

use super::lock_state;
use crate::{HardwareError, Result, traits::MotionSensor, types::DeviceInfo};
use std::sync::{Arc, Mutex};
use strongbox_core::AccelSample;

#[derive(Debug)]
struct MotionState {
    sample: AccelSample,
    available: bool,
}

/// Mock accelerometer resting at a fixed orientation.
///
/// The handle can move the reading, jolt it, or make the sensor vanish to
/// exercise degraded sensing.
#[derive(Debug)]
pub struct MockMotion {
    state: Arc<Mutex<MotionState>>,
}

impl MockMotion {
    /// Create a mock accelerometer lying flat (1 g on the z axis).
    pub fn new() -> (Self, MockMotionHandle) {
        let state = Arc::new(Mutex::new(MotionState {
            sample: AccelSample::new(0, 0, 16384),
            available: true,
        }));

        let handle = MockMotionHandle {
            state: Arc::clone(&state),
        };

        (Self { state }, handle)
    }

    fn unavailable() -> HardwareError {
        HardwareError::initialization_failed("accelerometer not responding on I2C 0x68")
    }
}

impl MotionSensor for MockMotion {
    async fn initialize(&mut self) -> Result<()> {
        if lock_state(&self.state).available {
            Ok(())
        } else {
            Err(Self::unavailable())
        }
    }

    async fn sample(&mut self) -> Result<AccelSample> {
        let state = lock_state(&self.state);
        if !state.available {
            return Err(HardwareError::communication(
                "accelerometer read returned NACK",
            ));
        }
        Ok(state.sample)
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Mock MPU6050", "Mock triaxial accelerometer"))
    }
}

/// Handle for moving the mock accelerometer.
#[derive(Debug, Clone)]
pub struct MockMotionHandle {
    state: Arc<Mutex<MotionState>>,
}

impl MockMotionHandle {
    /// Set the current reading.
    pub fn set_sample(&self, sample: AccelSample) {
        lock_state(&self.state).sample = sample;
    }

    /// Current reading.
    pub fn sample(&self) -> AccelSample {
        lock_state(&self.state).sample
    }

    /// Shift the x axis by `delta`, saturating at the sensor range.
    pub fn jolt(&self, delta: i16) {
        let mut state = lock_state(&self.state);
        state.sample.x = state.sample.x.saturating_add(delta);
    }

    /// Make the sensor fail (or recover) on every access.
    pub fn set_available(&self, available: bool) {
        lock_state(&self.state).available = available;
    }
}
