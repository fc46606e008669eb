//! Mock character display.
//!
//! Simulates the 2 x 16 character LCD of the vault front panel as a cell
//! buffer. Only printable ASCII is accepted by the controller; anything else
//! is rendered as `?`, the way the HD44780 character ROM shows unmapped codes.

use super::lock_state;
use crate::{HardwareError, Result, traits::DisplayDevice};
use std::sync::{Arc, Mutex};
use strongbox_core::constants::{DISPLAY_COLUMNS, DISPLAY_LINES};

/// Number of writes remembered by the transcript.
const TRANSCRIPT_LEN: usize = 256;

#[derive(Debug)]
struct DisplayState {
    cells: Vec<Vec<char>>,
    backlight: bool,
    transcript: Vec<String>,
}

impl DisplayState {
    fn blank(lines: usize, columns: usize) -> Vec<Vec<char>> {
        vec![vec![' '; columns]; lines]
    }
}

/// Mock character display.
///
/// # Examples
///
/// ```
/// use strongbox_hardware::mock::MockDisplay;
/// use strongbox_hardware::traits::DisplayDevice;
///
/// #[tokio::main]
/// async fn main() -> strongbox_hardware::Result<()> {
///     let (mut display, handle) = MockDisplay::new();
///
///     display.write_at(0, 0, "   ENTER PIN:   ").await?;
///     display.write_at(1, 5, "*").await?;
///
///     assert_eq!(handle.line(0).trim(), "ENTER PIN:");
///     assert_eq!(handle.line(1), "     *          ");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDisplay {
    lines: usize,
    columns: usize,
    state: Arc<Mutex<DisplayState>>,
}

impl MockDisplay {
    /// Create a blank 2 x 16 display with the backlight off.
    pub fn new() -> (Self, MockDisplayHandle) {
        Self::with_size(DISPLAY_LINES, DISPLAY_COLUMNS)
    }

    /// Create a blank display of the given geometry.
    pub fn with_size(lines: usize, columns: usize) -> (Self, MockDisplayHandle) {
        let state = Arc::new(Mutex::new(DisplayState {
            cells: DisplayState::blank(lines, columns),
            backlight: false,
            transcript: Vec::new(),
        }));

        let handle = MockDisplayHandle {
            state: Arc::clone(&state),
        };

        (
            Self {
                lines,
                columns,
                state,
            },
            handle,
        )
    }
}

impl DisplayDevice for MockDisplay {
    fn size(&self) -> (usize, usize) {
        (self.lines, self.columns)
    }

    async fn clear(&mut self) -> Result<()> {
        lock_state(&self.state).cells = DisplayState::blank(self.lines, self.columns);
        Ok(())
    }

    async fn write_at(&mut self, line: usize, column: usize, text: &str) -> Result<()> {
        if line >= self.lines || column >= self.columns {
            return Err(HardwareError::invalid_data(format!(
                "cursor ({line}, {column}) outside {}x{} display",
                self.lines, self.columns
            )));
        }

        let mut state = lock_state(&self.state);
        let row = &mut state.cells[line];
        for (cell, c) in row[column..].iter_mut().zip(text.chars()) {
            *cell = if c.is_ascii() && !c.is_ascii_control() {
                c
            } else {
                '?'
            };
        }

        if state.transcript.len() == TRANSCRIPT_LEN {
            state.transcript.remove(0);
        }
        state.transcript.push(text.to_string());
        Ok(())
    }

    async fn set_backlight(&mut self, enabled: bool) -> Result<()> {
        lock_state(&self.state).backlight = enabled;
        Ok(())
    }
}

/// Handle for reading back what a mock display shows.
#[derive(Debug, Clone)]
pub struct MockDisplayHandle {
    state: Arc<Mutex<DisplayState>>,
}

impl MockDisplayHandle {
    /// Text currently shown on a line, full width. Empty if out of range.
    pub fn line(&self, line: usize) -> String {
        lock_state(&self.state)
            .cells
            .get(line)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    /// Whether the backlight is on.
    pub fn backlight(&self) -> bool {
        lock_state(&self.state).backlight
    }

    /// Whether any recent write contained `text`.
    pub fn has_shown(&self, text: &str) -> bool {
        lock_state(&self.state)
            .transcript
            .iter()
            .any(|written| written.contains(text))
    }

    /// Forget the write transcript.
    pub fn clear_transcript(&self) {
        lock_state(&self.state).transcript.clear();
    }
}
