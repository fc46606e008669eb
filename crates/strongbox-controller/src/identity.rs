//! Identity input: keypad entry, tag reads and console signals.
//!
//! Keypad entry is a polling loop. After every keypad poll, whether or not a
//! key was pressed, the loop feeds the watchdog and re-checks the intrusion
//! monitor; an intrusion abandons the partial entry. In alarm mode the loop
//! instead drives the duress feedback and does not check for intrusion.

use crate::config::{AlarmConfig, TimingConfig};
use crate::display::Panel;
use crate::intrusion::{IntrusionMonitor, Sensing};
use crate::watchdog::Heartbeat;
use strongbox_core::constants::{PIN_LENGTH, TRIES_ENTRY_DIGITS};
use strongbox_core::{Identity, Pin, Result};
use strongbox_hardware::devices::{AnyKeypadDevice, AnySignalSource, AnyTagReader};
use strongbox_hardware::{ConsoleSignal, KeypadDevice, KeypadInput, SignalSource, TagReader};
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

/// Settings menu key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    /// `*`
    Confirm,
    /// `#`
    Next,
}

/// Result of a keypad entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<T> {
    /// Every digit was entered.
    Complete(T),
    /// An intrusion interrupted the entry; the partial input is gone.
    Preempted,
}

/// What an entry loop does between keypad polls.
#[derive(Debug)]
pub struct EntryGuard<'a> {
    pub panel: &'a mut Panel,
    pub intrusion: &'a mut IntrusionMonitor,
    pub heartbeat: &'a Heartbeat,
    pub timing: &'a TimingConfig,
    /// Sensors checked after each poll.
    pub sensing: Sensing,
    /// Duress feedback to drive instead of checking sensors.
    pub duress: Option<&'a AlarmConfig>,
}

/// Fixed-length digit accumulator. Holds ASCII digits.
#[derive(Debug, Clone, Copy)]
struct EntryBuffer<const N: usize> {
    digits: [u8; N],
    len: usize,
}

impl<const N: usize> EntryBuffer<N> {
    fn new() -> Self {
        Self {
            digits: [0; N],
            len: 0,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn push(&mut self, digit: u8) {
        if self.len < N {
            self.digits[self.len] = b'0' + digit;
            self.len += 1;
        }
    }

    fn complete(&self) -> Option<[u8; N]> {
        (self.len == N).then_some(self.digits)
    }
}

/// Keypad, tag reader and console signal source.
#[derive(Debug)]
pub struct IdentityInput {
    keypad: AnyKeypadDevice,
    tag_reader: AnyTagReader,
    signals: AnySignalSource,
}

impl IdentityInput {
    pub fn new(keypad: AnyKeypadDevice, tag_reader: AnyTagReader, signals: AnySignalSource) -> Self {
        Self {
            keypad,
            tag_reader,
            signals,
        }
    }

    /// Bring up the tag reader. A reader that fails stays silent; keypad and
    /// console signals keep working.
    pub async fn initialize(&mut self) {
        match self.keypad.get_info().await {
            Ok(info) => info!(device = %info, "Keypad ready"),
            Err(error) => warn!(error = %error, "Keypad did not identify itself"),
        }

        match self.tag_reader.initialize().await {
            Ok(()) => {
                if let Ok(info) = self.tag_reader.get_info().await {
                    info!(device = %info, "Tag reader ready");
                }
            }
            Err(error) => warn!(error = %error, "Tag reader initialisation failed"),
        }
    }

    /// Non-blocking tag read.
    pub async fn read_tag(&mut self) -> Identity {
        match self.tag_reader.poll_tag().await {
            Ok(Some(tag)) => Identity::Tag(tag.tag_id()),
            Ok(None) => Identity::None,
            Err(error) => {
                debug!(error = %error, "Tag read failed");
                Identity::None
            }
        }
    }

    /// Non-blocking console signal poll.
    ///
    /// # Errors
    ///
    /// Returns an error if the console link failed.
    pub async fn poll_signal(&mut self) -> Result<Option<ConsoleSignal>> {
        Ok(self.signals.poll_signal().await?)
    }

    /// Next `*` or `#` press. Digits pressed meanwhile are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad failed.
    pub async fn poll_menu_key(&mut self) -> Result<Option<MenuKey>> {
        while let Some(key) = self.keypad.poll_key().await? {
            match key {
                KeypadInput::Star => return Ok(Some(MenuKey::Confirm)),
                KeypadInput::Hash => return Ok(Some(MenuKey::Next)),
                KeypadInput::Digit(digit) => trace!(digit, "Ignoring digit on menu screen"),
            }
        }
        Ok(None)
    }

    /// Drop every pending key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad failed.
    pub async fn discard_keys(&mut self) -> Result<()> {
        while let Some(key) = self.keypad.poll_key().await? {
            trace!(key = %key.as_char(), "Discarding key");
        }
        Ok(())
    }

    /// Read a six-digit PIN.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad failed.
    pub async fn read_pin(&mut self, guard: &mut EntryGuard<'_>) -> Result<Entry<Pin>> {
        match self.read_digits::<PIN_LENGTH>(guard).await? {
            Entry::Complete(digits) => Ok(Entry::Complete(Pin::from_bytes(&digits)?)),
            Entry::Preempted => Ok(Entry::Preempted),
        }
    }

    /// Read a two-digit tries value (`00`..=`99`).
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad failed.
    pub async fn read_tries(&mut self, guard: &mut EntryGuard<'_>) -> Result<Entry<u8>> {
        match self.read_digits::<TRIES_ENTRY_DIGITS>(guard).await? {
            Entry::Complete(digits) => {
                let value = digits
                    .iter()
                    .fold(0u8, |acc, digit| acc * 10 + (digit - b'0'));
                Ok(Entry::Complete(value))
            }
            Entry::Preempted => Ok(Entry::Preempted),
        }
    }

    async fn read_digits<const N: usize>(
        &mut self,
        guard: &mut EntryGuard<'_>,
    ) -> Result<Entry<[u8; N]>> {
        let mut buffer = EntryBuffer::<N>::new();

        loop {
            guard.heartbeat.feed();

            if let Some(alarm) = guard.duress {
                guard.panel.duress_on(alarm).await;
            }

            if let Some(key) = self.keypad.poll_key().await? {
                match key.as_digit() {
                    Some(digit) => {
                        let index = buffer.len();
                        buffer.push(digit);
                        guard.panel.echo(index).await;
                    }
                    None => trace!(key = %key.as_char(), "Ignoring non-digit key during entry"),
                }
            }

            if guard.duress.is_some() {
                sleep(guard.timing.alarm_blink()).await;
                guard.panel.duress_off().await;
                sleep(guard.timing.alarm_blink()).await;
            } else if guard.intrusion.check(guard.sensing).await {
                debug!(entered = buffer.len(), "Entry preempted by intrusion");
                return Ok(Entry::Preempted);
            }

            if let Some(digits) = buffer.complete() {
                return Ok(Entry::Complete(digits));
            }

            if guard.duress.is_none() {
                sleep(guard.timing.poll_interval()).await;
            }
        }
    }
}
