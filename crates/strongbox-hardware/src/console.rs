//! Line-oriented maintenance console of the simulated board.
//!
//! Each console line is one command:
//!
//! | Line | Effect |
//! |------|--------|
//! | `opn`, `cfg`, `mov` | raise the matching [`ConsoleSignal`] |
//! | `door open`, `door close` | move the door switch |
//! | `shake` | jolt the accelerometer past any sane sensitivity |
//! | `tag <hex>` | present a tag; the UID is written as zero-padded hex bytes |
//! | anything else | typed on the keypad, one key per `0-9`, `*`, `#` |
//!
//! Lines are decoded with [`LinesCodec`]; over-long lines are discarded whole
//! and the lines after them are still read.

use crate::mock::{
    MockDoorHandle, MockKeypadHandle, MockMotionHandle, MockSignalsHandle, MockTagReaderHandle,
};
use crate::traits::{ConsoleSignal, KeypadInput};
use crate::{HardwareError, Result};
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

/// Longest accepted console line.
pub const MAX_LINE_LENGTH: usize = 256;

/// Initial size of the console read buffer.
const READ_CHUNK: usize = 1024;

/// Accelerometer delta applied by `shake`.
pub const SHAKE_DELTA: i16 = 8000;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Signal(ConsoleSignal),
    Door { open: bool },
    Shake,
    Tag(Vec<u8>),
    Keys(Vec<KeypadInput>),
}

impl ConsoleCommand {
    /// Parse one console line. Blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InvalidData`] for a malformed `door` or `tag`
    /// command.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_hardware::console::ConsoleCommand;
    /// use strongbox_hardware::traits::{ConsoleSignal, KeypadInput};
    ///
    /// assert_eq!(
    ///     ConsoleCommand::parse("opn").unwrap(),
    ///     Some(ConsoleCommand::Signal(ConsoleSignal::Open))
    /// );
    /// assert_eq!(
    ///     ConsoleCommand::parse("tag ba:ae:b1:15").unwrap(),
    ///     Some(ConsoleCommand::Tag(vec![0xba, 0xae, 0xb1, 0x15]))
    /// );
    /// assert_eq!(
    ///     ConsoleCommand::parse("1*").unwrap(),
    ///     Some(ConsoleCommand::Keys(vec![KeypadInput::Digit(1), KeypadInput::Star]))
    /// );
    /// assert_eq!(ConsoleCommand::parse("   ").unwrap(), None);
    /// ```
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if let Some(signal) = ConsoleSignal::parse(line) {
            return Ok(Some(Self::Signal(signal)));
        }

        let mut words = line.split_whitespace();
        let command = match (words.next(), words.next(), words.next()) {
            (Some("shake"), None, None) => Self::Shake,
            (Some("door"), Some("open"), None) => Self::Door { open: true },
            (Some("door"), Some("close"), None) => Self::Door { open: false },
            (Some("door"), _, _) => {
                return Err(HardwareError::invalid_data(format!(
                    "expected `door open` or `door close`, got `{line}`"
                )));
            }
            (Some("tag"), Some(hex), None) => Self::Tag(parse_uid(hex)?),
            (Some("tag"), _, _) => {
                return Err(HardwareError::invalid_data("expected `tag <hex>`"));
            }
            _ => Self::Keys(line.chars().filter_map(KeypadInput::from_char).collect()),
        };

        Ok(Some(command))
    }
}

/// Decode `4ae1c8a6469804` or `4a:e1:c8:a6:46:98:04` into bytes.
fn parse_uid(hex: &str) -> Result<Vec<u8>> {
    let digits: String = hex.chars().filter(|&c| c != ':').collect();

    if digits.is_empty() || digits.len() % 2 != 0 || !digits.is_ascii() {
        return Err(HardwareError::invalid_data(format!(
            "tag UID must be whole hex bytes, got `{hex}`"
        )));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| HardwareError::invalid_data(format!("not hexadecimal: `{hex}`")))
        })
        .collect()
}

/// Routes console lines to the input devices of a simulated board.
#[derive(Debug, Clone)]
pub struct ConsoleRouter {
    keypad: MockKeypadHandle,
    tags: MockTagReaderHandle,
    door: MockDoorHandle,
    motion: MockMotionHandle,
    signals: MockSignalsHandle,
}

impl ConsoleRouter {
    pub fn new(
        keypad: MockKeypadHandle,
        tags: MockTagReaderHandle,
        door: MockDoorHandle,
        motion: MockMotionHandle,
        signals: MockSignalsHandle,
    ) -> Self {
        Self {
            keypad,
            tags,
            door,
            motion,
            signals,
        }
    }

    /// Apply one parsed command to the board.
    ///
    /// # Errors
    ///
    /// Returns an error if the target device was dropped or rejects the input.
    pub async fn apply(&self, command: ConsoleCommand) -> Result<()> {
        match command {
            ConsoleCommand::Signal(signal) => self.signals.send(signal).await,
            ConsoleCommand::Door { open: true } => {
                self.door.open();
                Ok(())
            }
            ConsoleCommand::Door { open: false } => {
                self.door.close();
                Ok(())
            }
            ConsoleCommand::Shake => {
                let delta = if self.motion.sample().x > 0 {
                    -SHAKE_DELTA
                } else {
                    SHAKE_DELTA
                };
                self.motion.jolt(delta);
                Ok(())
            }
            ConsoleCommand::Tag(uid) => self.tags.present_uid(uid).await,
            ConsoleCommand::Keys(keys) => {
                for key in keys {
                    self.keypad.send_input(key).await?;
                }
                Ok(())
            }
        }
    }

    /// Parse and apply one console line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is malformed or cannot be delivered.
    pub async fn handle_line(&self, line: &str) -> Result<()> {
        match ConsoleCommand::parse(line)? {
            Some(command) => {
                debug!(?command, "console command");
                self.apply(command).await
            }
            None => Ok(()),
        }
    }

    /// Read console lines from `reader` until end of input.
    ///
    /// Malformed lines are logged and skipped. An over-long line is
    /// discarded up to its newline and reading carries on with the next one.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from `reader` fails.
    pub async fn run<R>(&self, mut reader: R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut codec = LinesCodec::new_with_max_length(MAX_LINE_LENGTH);
        let mut buffer = BytesMut::with_capacity(READ_CHUNK);

        loop {
            self.drain(&mut codec, &mut buffer, false).await?;
            if reader.read_buf(&mut buffer).await? == 0 {
                self.drain(&mut codec, &mut buffer, true).await?;
                break;
            }
        }

        info!("Console input closed");
        Ok(())
    }

    /// Apply every complete line in `buffer`; at end of input also the
    /// unterminated tail.
    async fn drain(&self, codec: &mut LinesCodec, buffer: &mut BytesMut, eof: bool) -> Result<()> {
        loop {
            let frame = if eof {
                codec.decode_eof(buffer)
            } else {
                codec.decode(buffer)
            };

            match frame {
                Ok(Some(line)) => self.dispatch(&line).await,
                Ok(None) => return Ok(()),
                // The codec keeps discarding up to the next newline.
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(max = MAX_LINE_LENGTH, "Console line too long, discarded");
                }
                Err(LinesCodecError::Io(e)) => return Err(e.into()),
            }
        }
    }

    async fn dispatch(&self, line: &str) {
        if let Err(e) = self.handle_line(line).await {
            warn!(error = %e, line = %line, "Console line rejected");
        }
    }
}

/// Open a serial port as the console input stream.
///
/// The port is read on a blocking thread and forwarded through an in-memory
/// pipe, so the result plugs straight into [`ConsoleRouter::run`].
///
/// # Errors
///
/// Returns an error if no Tokio runtime is running or the port cannot be opened.
#[cfg(feature = "hardware-serial")]
pub fn open_serial(path: &str, baud_rate: u32) -> Result<tokio::io::DuplexStream> {
    use std::io::{ErrorKind, Read};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| HardwareError::initialization_failed(e.to_string()))?;

    let mut port = serialport::new(path, baud_rate)
        .timeout(Duration::from_millis(100))
        .open()
        .map_err(|e| HardwareError::initialization_failed(format!("{path}: {e}")))?;

    let (reader, mut writer) = tokio::io::duplex(1024);
    let path = path.to_string();
    let forwarder = runtime.clone();

    runtime.spawn_blocking(move || {
        let mut buffer = [0u8; 64];
        loop {
            match port.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    if forwarder.block_on(writer.write_all(&buffer[..n])).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => {}
                Err(e) => {
                    warn!(port = %path, error = %e, "Serial console read failed");
                    break;
                }
            }
        }
    });

    info!(baud_rate, "Serial console opened");
    Ok(reader)
}
