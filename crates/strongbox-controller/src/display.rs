//! Presentation sink: the fixed screen catalogue, LEDs and buzzer.
//!
//! Every operation is fire-and-forget. A failing display or indicator is
//! logged and otherwise ignored, so presentation never changes a decision.

use crate::config::AlarmConfig;
use strongbox_core::ConfigScreen;
use strongbox_core::constants::{DISPLAY_COLUMNS, ENTRY_FIELD_COLUMN, PIN_LENGTH, TRIES_ENTRY_DIGITS};
use strongbox_hardware::devices::{AnyDisplayDevice, AnyIndicatorDevice};
use strongbox_hardware::{DisplayDevice, IndicatorDevice, Led};
use tracing::{trace, warn};

/// Hint shown under every configuration screen title.
const MENU_HINT: &str = "* OK      NEXT #";

/// Character marking an empty position of the entry field.
const ENTRY_BLANK: char = '-';

/// Character echoed for an entered digit.
const ENTRY_MASK: &str = "*";

/// Text alignment within a display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// One screen of the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// PIN prompt with an empty six-position entry field.
    EnterPin,
    /// New PIN prompt in the settings menu.
    EnterNewPin,
    /// Tries prompt with an empty two-position entry field.
    EnterTries,
    SettingsMenu,
    /// Alarm banner over the PIN entry field.
    Alarm,
    AlarmDisabled,
    DoorUnlocked,
    DoorLocked,
    /// Title of a configuration screen with the OK/NEXT hint.
    Menu(ConfigScreen),
    ExitingSettings,
    SaveFailed,
    InvalidValue,
    Saved,
}

impl Screen {
    /// Both lines, padded to the display width.
    ///
    /// # Examples
    ///
    /// ```
    /// use strongbox_controller::Screen;
    ///
    /// let [top, bottom] = Screen::EnterPin.lines();
    /// assert_eq!(top, "   ENTER PIN:   ");
    /// assert_eq!(bottom, "     ------     ");
    /// ```
    pub fn lines(&self) -> [String; 2] {
        let centered = |top: &str, bottom: &str| {
            [
                align_text(top, DISPLAY_COLUMNS, Alignment::Center),
                align_text(bottom, DISPLAY_COLUMNS, Alignment::Center),
            ]
        };

        match self {
            Self::EnterPin => [
                align_text("ENTER PIN:", DISPLAY_COLUMNS, Alignment::Center),
                entry_field(PIN_LENGTH),
            ],
            Self::EnterNewPin => [
                align_text("NEW PIN:", DISPLAY_COLUMNS, Alignment::Center),
                entry_field(PIN_LENGTH),
            ],
            Self::EnterTries => [
                align_text("ENTER TRIES:", DISPLAY_COLUMNS, Alignment::Center),
                entry_field(TRIES_ENTRY_DIGITS),
            ],
            Self::SettingsMenu => centered("SETTINGS", "MENU"),
            Self::Alarm => [
                align_text("ALARM!", DISPLAY_COLUMNS, Alignment::Center),
                entry_field(PIN_LENGTH),
            ],
            Self::AlarmDisabled => centered("ALARM", "DISABLED"),
            Self::DoorUnlocked => centered("DOOR", "UNLOCKED"),
            Self::DoorLocked => centered("DOOR", "LOCKED"),
            Self::Menu(screen) => [
                align_text(menu_title(*screen), DISPLAY_COLUMNS, Alignment::Center),
                MENU_HINT.to_string(),
            ],
            Self::ExitingSettings => centered("EXITING", "SETTINGS"),
            Self::SaveFailed => centered("SAVE", "FAILED"),
            Self::InvalidValue => centered("INVALID", "VALUE"),
            Self::Saved => centered("SAVED", ""),
        }
    }
}

fn menu_title(screen: ConfigScreen) -> &'static str {
    match screen {
        ConfigScreen::ChangePin => "CHANGE PIN",
        ConfigScreen::ChangeTries => "CHANGE TRIES",
        ConfigScreen::ExitConfig => "EXIT CONFIG",
    }
}

/// Empty entry field of `width` positions starting at the entry column.
fn entry_field(width: usize) -> String {
    let field: String = std::iter::repeat_n(ENTRY_BLANK, width).collect();
    align_text(
        &format!("{}{field}", " ".repeat(ENTRY_FIELD_COLUMN)),
        DISPLAY_COLUMNS,
        Alignment::Left,
    )
}

/// Truncate text to a maximum number of characters.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Align text within a fixed width, padding with spaces.
///
/// # Examples
///
/// ```
/// use strongbox_controller::{Alignment, align_text};
///
/// assert_eq!(align_text("DOOR", 10, Alignment::Left), "DOOR      ");
/// assert_eq!(align_text("DOOR", 10, Alignment::Center), "   DOOR   ");
/// assert_eq!(align_text("DOOR", 10, Alignment::Right), "      DOOR");
/// ```
pub fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let char_count = text.chars().count();
    if char_count >= width {
        return truncate_text(text, width);
    }

    let padding = width - char_count;
    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        Alignment::Center => {
            let left_pad = padding / 2;
            let right_pad = padding - left_pad;
            format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
        }
    }
}

/// Front panel of the vault: character display plus LEDs and buzzer.
#[derive(Debug)]
pub struct Panel {
    display: AnyDisplayDevice,
    indicator: AnyIndicatorDevice,
}

impl Panel {
    pub fn new(display: AnyDisplayDevice, indicator: AnyIndicatorDevice) -> Self {
        Self { display, indicator }
    }

    /// Replace the display contents with a screen and switch the backlight on.
    pub async fn show(&mut self, screen: Screen) {
        trace!(?screen, "Showing screen");
        let [top, bottom] = screen.lines();

        report("display", self.display.clear().await);
        report("display", self.display.set_backlight(true).await);
        report("display", self.display.write_at(0, 0, &top).await);
        report("display", self.display.write_at(1, 0, &bottom).await);
    }

    /// Clear the display and switch the backlight off.
    pub async fn blank(&mut self) {
        report("display", self.display.clear().await);
        report("display", self.display.set_backlight(false).await);
    }

    /// Mark entry position `index` as filled.
    pub async fn echo(&mut self, index: usize) {
        report(
            "display",
            self.display
                .write_at(1, ENTRY_FIELD_COLUMN + index, ENTRY_MASK)
                .await,
        );
    }

    pub async fn set_led(&mut self, led: Led, on: bool) {
        report("indicator", self.indicator.set_led(led, on).await);
    }

    /// Red LED on and an alarm tone.
    pub async fn duress_on(&mut self, alarm: &AlarmConfig) {
        report("indicator", self.indicator.set_led(Led::Red, true).await);
        report(
            "indicator",
            self.indicator.tone(alarm.tone_hz, alarm.tone_ms).await,
        );
    }

    /// Red LED off and buzzer silenced.
    pub async fn duress_off(&mut self) {
        report("indicator", self.indicator.set_led(Led::Red, false).await);
        report("indicator", self.indicator.silence().await);
    }

    /// Every LED off and buzzer silenced.
    pub async fn quiet(&mut self) {
        self.duress_off().await;
        report("indicator", self.indicator.set_led(Led::Green, false).await);
    }
}

fn report(device: &str, result: strongbox_hardware::Result<()>) {
    if let Err(error) = result {
        warn!(device, error = %error, "Presentation output failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strongbox_hardware::mock::{MockDisplay, MockDisplayHandle, MockIndicator, MockIndicatorHandle};

    fn panel() -> (Panel, MockDisplayHandle, MockIndicatorHandle) {
        let (display, display_handle) = MockDisplay::new();
        let (indicator, indicator_handle) = MockIndicator::new();
        let panel = Panel::new(
            AnyDisplayDevice::Mock(display),
            AnyIndicatorDevice::Mock(indicator),
        );
        (panel, display_handle, indicator_handle)
    }

    #[rstest]
    #[case(Screen::SettingsMenu, "    SETTINGS    ", "      MENU      ")]
    #[case(Screen::Alarm, "     ALARM!     ", "     ------     ")]
    #[case(Screen::AlarmDisabled, "     ALARM      ", "    DISABLED    ")]
    #[case(Screen::DoorUnlocked, "      DOOR      ", "    UNLOCKED    ")]
    #[case(Screen::DoorLocked, "      DOOR      ", "     LOCKED     ")]
    #[case(Screen::Menu(ConfigScreen::ChangePin), "   CHANGE PIN   ", "* OK      NEXT #")]
    #[case(Screen::Menu(ConfigScreen::ChangeTries), "  CHANGE TRIES  ", "* OK      NEXT #")]
    #[case(Screen::ExitingSettings, "    EXITING     ", "    SETTINGS    ")]
    #[case(Screen::EnterTries, "  ENTER TRIES:  ", "     --         ")]
    fn test_screen_lines(#[case] screen: Screen, #[case] top: &str, #[case] bottom: &str) {
        let [first, second] = screen.lines();
        assert_eq!(first, top);
        assert_eq!(second, bottom);
    }

    #[test]
    fn test_every_line_fits_the_display() {
        let screens = [
            Screen::EnterPin,
            Screen::EnterNewPin,
            Screen::EnterTries,
            Screen::SettingsMenu,
            Screen::Alarm,
            Screen::AlarmDisabled,
            Screen::DoorUnlocked,
            Screen::DoorLocked,
            Screen::Menu(ConfigScreen::ChangePin),
            Screen::Menu(ConfigScreen::ChangeTries),
            Screen::Menu(ConfigScreen::ExitConfig),
            Screen::ExitingSettings,
            Screen::SaveFailed,
            Screen::InvalidValue,
            Screen::Saved,
        ];
        for screen in screens {
            for line in screen.lines() {
                assert_eq!(line.chars().count(), DISPLAY_COLUMNS, "{screen:?}");
            }
        }
    }

    #[test]
    fn test_align_text_truncates() {
        assert_eq!(align_text("ABCDEFGHIJ", 4, Alignment::Center), "ABCD");
    }

    #[tokio::test]
    async fn test_show_then_echo_masks_digits() {
        let (mut panel, display, _) = panel();

        panel.show(Screen::EnterPin).await;
        panel.echo(0).await;
        panel.echo(1).await;

        assert!(display.backlight());
        assert_eq!(display.line(0), "   ENTER PIN:   ");
        assert_eq!(display.line(1), "     **----     ");
    }

    #[tokio::test]
    async fn test_blank_switches_backlight_off() {
        let (mut panel, display, _) = panel();
        panel.show(Screen::Alarm).await;
        panel.blank().await;

        assert!(!display.backlight());
        assert_eq!(display.line(0).trim(), "");
    }

    #[tokio::test]
    async fn test_duress_and_quiet() {
        let (mut panel, _, indicator) = panel();

        panel.duress_on(&AlarmConfig::default()).await;
        assert!(indicator.led(Led::Red));
        assert!(indicator.is_sounding());

        panel.set_led(Led::Green, true).await;
        panel.quiet().await;
        assert!(!indicator.led(Led::Red));
        assert!(!indicator.led(Led::Green));
        assert!(!indicator.is_sounding());
    }
}
