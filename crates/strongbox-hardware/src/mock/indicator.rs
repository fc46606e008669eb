//! Mock LEDs and buzzer.

use super::lock_state;
use crate::{Result, traits::IndicatorDevice, types::Led};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct IndicatorState {
    red: bool,
    green: bool,
    red_flashes: usize,
    tones: Vec<(u32, u32)>,
    sounding: bool,
}

/// Mock indicator panel. Records LED state and every tone started.
#[derive(Debug)]
pub struct MockIndicator {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicator {
    /// Create a dark, silent indicator panel and its inspection handle.
    pub fn new() -> (Self, MockIndicatorHandle) {
        let state = Arc::new(Mutex::new(IndicatorState::default()));
        let handle = MockIndicatorHandle {
            state: Arc::clone(&state),
        };
        (Self { state }, handle)
    }
}

impl IndicatorDevice for MockIndicator {
    async fn set_led(&mut self, led: Led, on: bool) -> Result<()> {
        let mut state = lock_state(&self.state);
        match led {
            Led::Red => {
                if on && !state.red {
                    state.red_flashes += 1;
                }
                state.red = on;
            }
            Led::Green => state.green = on,
        }
        Ok(())
    }

    async fn tone(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<()> {
        let mut state = lock_state(&self.state);
        state.tones.push((frequency_hz, duration_ms));
        state.sounding = true;
        Ok(())
    }

    async fn silence(&mut self) -> Result<()> {
        lock_state(&self.state).sounding = false;
        Ok(())
    }
}

/// Handle for inspecting a mock indicator panel.
#[derive(Debug, Clone)]
pub struct MockIndicatorHandle {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicatorHandle {
    /// Whether the LED is lit.
    pub fn led(&self, led: Led) -> bool {
        let state = lock_state(&self.state);
        match led {
            Led::Red => state.red,
            Led::Green => state.green,
        }
    }

    /// Number of times the red LED went from dark to lit.
    pub fn red_flashes(&self) -> usize {
        lock_state(&self.state).red_flashes
    }

    /// Number of tones started.
    pub fn tone_count(&self) -> usize {
        lock_state(&self.state).tones.len()
    }

    /// Whether a tone was started and not silenced since.
    pub fn is_sounding(&self) -> bool {
        lock_state(&self.state).sounding
    }
}
