use crate::{
    Result,
    constants::{DEFAULT_MAX_TRIES, DEFAULT_PIN, PIN_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Six-digit keypad PIN.
///
/// # Security
/// Equality is evaluated in constant time over all six bytes so that the
/// comparison does not reveal how many leading digits were correct.
/// `Debug` and `Display` never print the digits.
#[derive(Clone, Copy, Eq)]
pub struct Pin([u8; PIN_LENGTH]);

impl Pin {
    /// Create a PIN from its textual form.
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` unless the input is exactly six ASCII digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_core::Pin;
    ///
    /// assert!(Pin::new("123456").is_ok());
    /// assert!(Pin::new("12345").is_err());
    /// assert!(Pin::new("12345a").is_err());
    /// ```
    pub fn new(pin: &str) -> Result<Self> {
        Self::from_bytes(pin.as_bytes())
    }

    /// Create a PIN from raw ASCII bytes (as read back from storage).
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` unless `bytes` holds exactly six ASCII digits.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let digits: [u8; PIN_LENGTH] = bytes.try_into().map_err(|_| {
            Error::InvalidPin(format!(
                "PIN must be {PIN_LENGTH} digits, got {}",
                bytes.len()
            ))
        })?;

        if let Some(position) = digits.iter().position(|b| !b.is_ascii_digit()) {
            return Err(Error::InvalidPin(format!(
                "non-digit character at position {position}"
            )));
        }

        Ok(Pin(digits))
    }

    /// Get the PIN digits as ASCII bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PIN_LENGTH] {
        &self.0
    }
}

impl Default for Pin {
    fn default() -> Self {
        let mut digits = [b'0'; PIN_LENGTH];
        digits.copy_from_slice(DEFAULT_PIN.as_bytes());
        Pin(digits)
    }
}

impl PartialEq for Pin {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pin([REDACTED])")
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "*".repeat(PIN_LENGTH))
    }
}

impl std::str::FromStr for Pin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pin::new(s)
    }
}

/// Persisted credential: the PIN and the number of attempts allowed before
/// lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    pin: Pin,
    max_tries: u8,
}

impl Credential {
    /// Create a credential.
    ///
    /// # Errors
    /// Returns `Error::InvalidTries` if `max_tries` is zero.
    pub fn new(pin: Pin, max_tries: u8) -> Result<Self> {
        if max_tries == 0 {
            return Err(Error::InvalidTries(max_tries));
        }
        Ok(Self { pin, max_tries })
    }

    #[must_use]
    pub fn pin(&self) -> &Pin {
        &self.pin
    }

    #[must_use]
    pub fn max_tries(&self) -> u8 {
        self.max_tries
    }

    /// Check an entered PIN against the stored one.
    #[must_use]
    pub fn verify(&self, entered: &Pin) -> bool {
        self.pin == *entered
    }

    /// Copy of this credential with a new PIN.
    #[must_use]
    pub fn with_pin(self, pin: Pin) -> Self {
        Self { pin, ..self }
    }

    /// Copy of this credential with a new attempt limit.
    ///
    /// # Errors
    /// Returns `Error::InvalidTries` if `max_tries` is zero.
    pub fn with_max_tries(self, max_tries: u8) -> Result<Self> {
        Self::new(self.pin, max_tries)
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self {
            pin: Pin::default(),
            max_tries: DEFAULT_MAX_TRIES,
        }
    }
}

/// Identifier read from a proximity tag.
///
/// Rendered in compact lowercase hex: each UID byte is printed without zero
/// padding, so `[0x4a, 0x04]` becomes `"4a4"`. Registered tags use the same
/// rendering, and matching is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagId(String);

impl TagId {
    /// Create a tag identifier from its textual form.
    ///
    /// The identifier is trimmed and lowercased.
    ///
    /// # Errors
    /// Returns `Error::InvalidTag` if the identifier is empty or not hexadecimal.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_core::TagId;
    ///
    /// let tag = TagId::new("BAAEB115").unwrap();
    /// assert_eq!(tag.as_str(), "baaeb115");
    /// assert!(TagId::new("").is_err());
    /// assert!(TagId::new("xyz").is_err());
    /// ```
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim().to_ascii_lowercase();

        if id.is_empty() {
            return Err(Error::InvalidTag("tag identifier is empty".to_string()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidTag(format!("not hexadecimal: {id}")));
        }

        Ok(TagId(id))
    }

    /// Render a raw UID the way the reader reports it.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_core::TagId;
    ///
    /// let tag = TagId::from_uid(&[0x4a, 0xe1, 0xc8, 0xa6, 0x46, 0x98, 0x04]);
    /// assert_eq!(tag.as_str(), "4ae1c8a646984");
    /// ```
    #[must_use]
    pub fn from_uid(uid: &[u8]) -> Self {
        TagId(uid.iter().map(|byte| format!("{byte:x}")).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TagId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TagId::new(&value)
    }
}

impl From<TagId> for String {
    fn from(tag: TagId) -> Self {
        tag.0
    }
}

/// Mode entered after a successful authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthDestination {
    Unlock,
    Configure,
}

impl fmt::Display for AuthDestination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthDestination::Unlock => write!(f, "Unlock"),
            AuthDestination::Configure => write!(f, "Configure"),
        }
    }
}

/// The two distinguished tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRegistry {
    /// Tag that requests an unlock.
    pub open_tag: TagId,
    /// Tag that requests the settings menu.
    pub config_tag: TagId,
}

impl TagRegistry {
    /// Create a registry.
    ///
    /// # Errors
    /// Returns `Error::InvalidTag` if both roles use the same tag.
    pub fn new(open_tag: TagId, config_tag: TagId) -> Result<Self> {
        if open_tag == config_tag {
            return Err(Error::InvalidTag(format!(
                "open and config tags must differ, both are {open_tag}"
            )));
        }
        Ok(Self {
            open_tag,
            config_tag,
        })
    }

    /// Map a scanned tag to the authentication it requests.
    ///
    /// Unknown tags map to `None` and are ignored by the controller.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_core::{AuthDestination, TagId, TagRegistry};
    ///
    /// let registry = TagRegistry::default();
    /// let config = TagId::new("baaeb115").unwrap();
    /// assert_eq!(registry.classify(&config), Some(AuthDestination::Configure));
    /// assert_eq!(registry.classify(&TagId::new("ff").unwrap()), None);
    /// ```
    #[must_use]
    pub fn classify(&self, tag: &TagId) -> Option<AuthDestination> {
        if *tag == self.open_tag {
            Some(AuthDestination::Unlock)
        } else if *tag == self.config_tag {
            Some(AuthDestination::Configure)
        } else {
            None
        }
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self {
            open_tag: TagId(crate::constants::DEFAULT_OPEN_TAG.to_string()),
            config_tag: TagId(crate::constants::DEFAULT_CONFIG_TAG.to_string()),
        }
    }
}

/// One authentication event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// A completed six-digit keypad entry.
    Pin(Pin),
    /// A scanned tag.
    Tag(TagId),
    /// Nothing presented yet.
    None,
}

impl Identity {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Identity::None)
    }
}

/// Active settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigScreen {
    ChangePin,
    ChangeTries,
    ExitConfig,
}

impl ConfigScreen {
    /// Screen shown after pressing "next"; the menu wraps around.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_core::ConfigScreen;
    ///
    /// assert_eq!(ConfigScreen::ChangePin.next(), ConfigScreen::ChangeTries);
    /// assert_eq!(ConfigScreen::ExitConfig.next(), ConfigScreen::ChangePin);
    /// ```
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            ConfigScreen::ChangePin => ConfigScreen::ChangeTries,
            ConfigScreen::ChangeTries => ConfigScreen::ExitConfig,
            ConfigScreen::ExitConfig => ConfigScreen::ChangePin,
        }
    }
}

impl fmt::Display for ConfigScreen {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigScreen::ChangePin => write!(f, "ChangePin"),
            ConfigScreen::ChangeTries => write!(f, "ChangeTries"),
            ConfigScreen::ExitConfig => write!(f, "ExitConfig"),
        }
    }
}

/// Controller mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Waiting for a tag, a console signal, or an intrusion.
    Idle,
    /// Waiting for a correct PIN.
    Authenticating,
    /// Intrusion or lockout; only a correct PIN clears it.
    Alarm,
    /// Bolt retracted, waiting for the door to close.
    Unlocked,
    /// Settings menu, positioned on the given screen.
    Configuring(ConfigScreen),
}

impl Mode {
    /// Check if a transition to `target` is allowed from this mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_core::{ConfigScreen, Mode};
    ///
    /// assert!(Mode::Idle.can_transition_to(&Mode::Authenticating));
    /// assert!(!Mode::Idle.can_transition_to(&Mode::Unlocked));
    /// assert!(Mode::Authenticating.can_transition_to(&Mode::Configuring(ConfigScreen::ChangePin)));
    /// assert!(!Mode::Authenticating.can_transition_to(&Mode::Configuring(ConfigScreen::ExitConfig)));
    /// ```
    #[must_use]
    pub fn can_transition_to(&self, target: &Mode) -> bool {
        match (self, target) {
            (Mode::Idle, Mode::Authenticating | Mode::Alarm) => true,
            (
                Mode::Authenticating,
                Mode::Unlocked | Mode::Alarm | Mode::Configuring(ConfigScreen::ChangePin),
            ) => true,
            (Mode::Alarm, Mode::Idle) => true,
            (Mode::Unlocked, Mode::Idle) => true,
            (Mode::Configuring(ConfigScreen::ExitConfig), Mode::Idle) => true,
            (Mode::Configuring(_), Mode::Alarm) => true,
            (Mode::Configuring(from), Mode::Configuring(to)) => from.next() == *to,
            _ => false,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Idle => write!(f, "Idle"),
            Mode::Authenticating => write!(f, "Authenticating"),
            Mode::Alarm => write!(f, "Alarm"),
            Mode::Unlocked => write!(f, "Unlocked"),
            Mode::Configuring(screen) => write!(f, "Configuring({screen})"),
        }
    }
}

/// Triaxial acceleration sample in raw sensor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl AccelSample {
    #[must_use]
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Largest absolute per-axis difference to another sample.
    ///
    /// Computed in `u32` so opposite extremes do not overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_core::AccelSample;
    ///
    /// let a = AccelSample::new(0, 100, -50);
    /// let b = AccelSample::new(10, -400, -50);
    /// assert_eq!(a.max_axis_delta(&b), 500);
    /// assert_eq!(AccelSample::new(i16::MIN, 0, 0).max_axis_delta(&AccelSample::new(i16::MAX, 0, 0)), 65535);
    /// ```
    #[must_use]
    pub fn max_axis_delta(&self, other: &AccelSample) -> u32 {
        [
            (self.x, other.x),
            (self.y, other.y),
            (self.z, other.z),
        ]
        .into_iter()
        .map(|(a, b)| (i32::from(a) - i32::from(b)).unsigned_abs())
        .max()
        .unwrap_or(0)
    }
}

/// Bolt position commanded to the lock actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPosition {
    Locked,
    Unlocked,
}

impl fmt::Display for LockPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LockPosition::Locked => write!(f, "Locked"),
            LockPosition::Unlocked => write!(f, "Unlocked"),
        }
    }
}
