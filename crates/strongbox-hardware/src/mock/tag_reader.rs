//! Mock proximity tag reader.

use crate::{
    HardwareError, Result,
    traits::{TagData, TagReader},
    types::DeviceInfo,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Mock tag reader for testing and development.
///
/// Tags presented through a [`MockTagReaderHandle`] are reported once each,
/// in order, by [`poll_tag`](TagReader::poll_tag).
///
/// # Examples
///
/// ```
/// use strongbox_hardware::mock::MockTagReader;
/// use strongbox_hardware::traits::TagReader;
///
/// #[tokio::main]
/// async fn main() -> strongbox_hardware::Result<()> {
///     let (mut reader, handle) = MockTagReader::new();
///     reader.initialize().await?;
///
///     handle.present_uid(vec![0xba, 0xae, 0xb1, 0x15]).await?;
///
///     let tag = reader.poll_tag().await?.expect("tag presented");
///     assert_eq!(tag.tag_id().as_str(), "baaeb115");
///     assert!(reader.poll_tag().await?.is_none());
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTagReader {
    /// Channel receiver for presented tags
    tag_rx: mpsc::Receiver<TagData>,

    /// Device name
    name: String,

    /// Whether `initialize` has been called
    initialized: bool,
}

impl MockTagReader {
    /// Create a new mock tag reader and its control handle.
    pub fn new() -> (Self, MockTagReaderHandle) {
        let (tag_tx, tag_rx) = mpsc::channel(16);

        let reader = Self {
            tag_rx,
            name: "Mock MFRC522".to_string(),
            initialized: false,
        };

        (reader, MockTagReaderHandle { tag_tx })
    }

    /// Whether the reader has been initialised.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Default for MockTagReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl TagReader for MockTagReader {
    async fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    async fn poll_tag(&mut self) -> Result<Option<TagData>> {
        if !self.initialized {
            return Err(HardwareError::disconnected(format!(
                "{} not initialised",
                self.name
            )));
        }

        match self.tag_rx.try_recv() {
            Ok(tag) => Ok(Some(tag)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock ISO14443A reader"))
    }
}

/// Handle for presenting tags to a mock reader.
#[derive(Debug, Clone)]
pub struct MockTagReaderHandle {
    tag_tx: mpsc::Sender<TagData>,
}

impl MockTagReaderHandle {
    /// Hold a tag with the given UID against the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is invalid or the reader was dropped.
    pub async fn present_uid(&self, uid: Vec<u8>) -> Result<()> {
        let tag = TagData::new(uid)?;
        self.tag_tx
            .send(tag)
            .await
            .map_err(|_| HardwareError::disconnected("Tag reader channel closed"))
    }
}
