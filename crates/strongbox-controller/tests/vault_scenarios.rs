//! End-to-end scenarios over the simulated board.
//!
//! Run with: cargo test --package strongbox-controller --test vault_scenarios

mod common;

use common::{CONFIG_TAG_UID, OPEN_TAG_UID, image, pin, vault, vault_with_image};
use rstest::rstest;
use std::time::Duration;
use strongbox_core::{ConfigScreen, LockPosition, Mode};
use strongbox_hardware::mock::ERASED_BYTE;
use strongbox_hardware::{ConsoleSignal, Led};

#[tokio::test(start_paused = true)]
async fn test_third_attempt_unlocks_with_three_tries() {
    let mut vault = vault("123456", 3).await;
    vault.signal(ConsoleSignal::Open).await;

    assert_eq!(vault.attempt("000000").await, Mode::Authenticating);
    assert_eq!(vault.attempt("111111").await, Mode::Authenticating);
    assert_eq!(vault.attempt("123456").await, Mode::Unlocked);

    assert_eq!(vault.board.lock.position(), LockPosition::Unlocked);
    assert!(vault.board.indicator.led(Led::Green));
    assert!(vault.board.display.has_shown("UNLOCKED"));
}

#[tokio::test(start_paused = true)]
async fn test_two_wrong_pins_with_two_tries_alarm() {
    let mut vault = vault("123456", 2).await;
    vault.signal(ConsoleSignal::Open).await;

    assert_eq!(vault.attempt("000000").await, Mode::Authenticating);
    assert_eq!(vault.attempt("111111").await, Mode::Alarm);

    assert!(vault.board.lock.commands().is_empty());
    assert_eq!(vault.board.display.line(0), "     ALARM!     ");
}

#[tokio::test(start_paused = true)]
async fn test_config_tag_then_pin_opens_settings() {
    let mut vault = vault("123456", 3).await;
    vault.board.tags.present_uid(CONFIG_TAG_UID.to_vec()).await.unwrap();
    vault.controller.step().await.unwrap();
    assert_eq!(vault.controller.mode(), Mode::Authenticating);

    assert_eq!(
        vault.attempt("123456").await,
        Mode::Configuring(ConfigScreen::ChangePin)
    );
    assert!(vault.board.display.has_shown("SETTINGS"));
}

#[tokio::test(start_paused = true)]
async fn test_open_tag_then_pin_unlocks() {
    let mut vault = vault("654321", 3).await;
    vault.board.tags.present_uid(OPEN_TAG_UID.to_vec()).await.unwrap();
    vault.controller.step().await.unwrap();

    assert_eq!(vault.attempt("654321").await, Mode::Unlocked);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(5)]
#[tokio::test(start_paused = true)]
async fn test_alarm_exactly_after_max_tries(#[case] tries: u8) {
    let mut vault = vault("123456", tries).await;
    vault.signal(ConsoleSignal::Open).await;

    for _ in 1..tries {
        assert_eq!(vault.attempt("999999").await, Mode::Authenticating);
    }
    assert_eq!(vault.attempt("999999").await, Mode::Alarm);

    let alarms = vault
        .controller
        .history()
        .iter()
        .filter(|transition| transition.to == Mode::Alarm)
        .count();
    assert_eq!(alarms, 1);
}

#[tokio::test(start_paused = true)]
async fn test_tries_reset_on_new_cycle() {
    let mut vault = vault("123456", 2).await;
    vault.signal(ConsoleSignal::Open).await;
    vault.attempt("000000").await;
    assert_eq!(vault.controller.session().remaining_tries(), 1);

    vault.attempt("123456").await;
    vault.controller.step().await.unwrap();
    assert_eq!(vault.controller.mode(), Mode::Idle);

    vault.signal(ConsoleSignal::Open).await;
    assert_eq!(vault.controller.session().remaining_tries(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_door_opened_during_entry_preempts() {
    let mut vault = vault("123456", 3).await;
    vault.signal(ConsoleSignal::Open).await;

    vault.keys("123").await;
    vault.board.door.open();
    vault.controller.step().await.unwrap();

    assert_eq!(vault.controller.mode(), Mode::Alarm);
    assert!(vault.board.lock.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shake_during_entry_preempts() {
    let mut vault = vault("123456", 3).await;
    vault.signal(ConsoleSignal::Open).await;

    vault.keys("12").await;
    vault.board.motion.jolt(8000);
    vault.controller.step().await.unwrap();

    assert_eq!(vault.controller.mode(), Mode::Alarm);
}

#[tokio::test(start_paused = true)]
async fn test_alarm_cleared_then_idle_with_fresh_baseline() {
    let mut vault = vault("123456", 3).await;
    vault.board.motion.jolt(8000);
    vault.controller.step().await.unwrap();
    assert_eq!(vault.controller.mode(), Mode::Alarm);

    assert_eq!(vault.attempt("000000").await, Mode::Alarm);
    assert_eq!(vault.attempt("123456").await, Mode::Idle);

    assert_eq!(vault.controller.step().await.unwrap(), None);
    assert_eq!(vault.controller.mode(), Mode::Idle);
    assert!(!vault.board.indicator.is_sounding());
}

#[tokio::test(start_paused = true)]
async fn test_closing_door_locks_exactly_once() {
    let mut vault = vault("123456", 3).await;
    vault.signal(ConsoleSignal::Open).await;
    vault.attempt("123456").await;
    vault.board.door.open();

    for _ in 0..10 {
        vault.controller.step().await.unwrap();
    }
    assert_eq!(vault.controller.mode(), Mode::Unlocked);
    assert_eq!(vault.board.lock.count(LockPosition::Locked), 0);

    vault.board.door.close();
    vault.controller.step().await.unwrap();
    assert_eq!(vault.controller.mode(), Mode::Idle);

    for _ in 0..10 {
        vault.controller.step().await.unwrap();
    }
    assert_eq!(vault.board.lock.count(LockPosition::Locked), 1);
    assert_eq!(vault.board.lock.position(), LockPosition::Locked);
    assert!(vault.board.display.has_shown("LOCKED"));
}

#[tokio::test(start_paused = true)]
async fn test_menu_cycles_through_screens() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;

    let expected = [
        ConfigScreen::ChangeTries,
        ConfigScreen::ExitConfig,
        ConfigScreen::ChangePin,
        ConfigScreen::ChangeTries,
    ];
    for screen in expected {
        vault.keys("#").await;
        let transition = vault.controller.step().await.unwrap().unwrap();
        assert_eq!(transition.to, Mode::Configuring(screen));
    }
}

#[tokio::test(start_paused = true)]
async fn test_exit_config_returns_to_idle() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;

    vault.keys("##").await;
    vault.controller.step().await.unwrap();
    vault.controller.step().await.unwrap();
    assert_eq!(vault.controller.mode(), Mode::Configuring(ConfigScreen::ExitConfig));

    vault.keys("*").await;
    let transition = vault.controller.step().await.unwrap().unwrap();
    assert_eq!(transition.to, Mode::Idle);
    assert!(vault.board.display.has_shown("EXITING"));
    assert!(!vault.board.display.backlight());
}

#[tokio::test(start_paused = true)]
async fn test_change_pin_persists() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;

    vault.keys("*654321").await;
    assert_eq!(vault.controller.step().await.unwrap(), None);

    assert_eq!(vault.controller.mode(), Mode::Configuring(ConfigScreen::ChangePin));
    assert!(vault.controller.credential().verify(&pin("654321")));
    assert_eq!(vault.stored(), (b"654321".to_vec(), 3));
    assert!(vault.board.display.has_shown("SAVED"));
}

#[tokio::test(start_paused = true)]
async fn test_change_tries_persists() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;

    vault.keys("#*07").await;
    vault.controller.step().await.unwrap();
    assert_eq!(vault.controller.step().await.unwrap(), None);

    assert_eq!(vault.controller.credential().max_tries(), 7);
    assert_eq!(vault.stored(), (b"123456".to_vec(), 7));
    assert_eq!(vault.controller.mode(), Mode::Configuring(ConfigScreen::ChangeTries));
}

#[tokio::test(start_paused = true)]
async fn test_new_tries_apply_to_next_cycle() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;

    vault.keys("#*01").await;
    vault.controller.step().await.unwrap();
    vault.controller.step().await.unwrap();

    vault.keys("#*").await;
    vault.controller.step().await.unwrap();
    vault.controller.step().await.unwrap();
    assert_eq!(vault.controller.mode(), Mode::Idle);

    vault.signal(ConsoleSignal::Open).await;
    assert_eq!(vault.attempt("000000").await, Mode::Alarm);
}

#[tokio::test(start_paused = true)]
async fn test_failed_write_keeps_credential() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;
    vault.eeprom.set_reject_writes(true);

    vault.keys("*999999").await;
    vault.controller.step().await.unwrap();

    assert!(vault.controller.credential().verify(&pin("123456")));
    assert!(vault.board.display.has_shown("FAILED"));
    assert_eq!(vault.controller.mode(), Mode::Configuring(ConfigScreen::ChangePin));
}

#[tokio::test(start_paused = true)]
async fn test_write_failing_midway_keeps_old_pin_after_restart() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;
    vault.eeprom.fail_nth_write(4);

    vault.keys("*999999").await;
    vault.controller.step().await.unwrap();
    assert!(vault.board.display.has_shown("FAILED"));
    assert_eq!(vault.stored(), (b"123456".to_vec(), 3));

    vault.controller.restart().await;
    assert!(vault.controller.credential().verify(&pin("123456")));

    vault.signal(ConsoleSignal::Open).await;
    assert_eq!(vault.attempt("123456").await, Mode::Unlocked);
}

#[tokio::test(start_paused = true)]
async fn test_door_opened_in_settings_raises_alarm() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;

    vault.board.door.open();
    let transition = vault.controller.step().await.unwrap().unwrap();
    assert_eq!(transition.to, Mode::Alarm);
}

#[tokio::test(start_paused = true)]
async fn test_settings_ignore_movement() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;

    vault.board.motion.jolt(8000);
    vault.keys("#").await;
    let transition = vault.controller.step().await.unwrap().unwrap();
    assert_eq!(transition.to, Mode::Configuring(ConfigScreen::ChangeTries));
}

#[tokio::test(start_paused = true)]
async fn test_intrusion_while_entering_new_pin() {
    let mut vault = vault("123456", 3).await;
    vault.enter_settings("123456").await;

    vault.keys("*12").await;
    let door = vault.board.door.clone();
    let (result, ()) = tokio::join!(vault.controller.step(), async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        door.open();
    });

    assert_eq!(result.unwrap().unwrap().to, Mode::Alarm);
    assert!(vault.board.display.has_shown("NEW PIN:"));
    assert_eq!(vault.stored(), (b"123456".to_vec(), 3));
}

#[tokio::test(start_paused = true)]
async fn test_blank_eeprom_recovers_default_pin() {
    let mut vault = vault_with_image(vec![ERASED_BYTE; 1024]).await;

    assert!(vault.controller.credential().verify(&pin("000000")));
    assert_eq!(vault.eeprom.write_count(), 0);

    vault.signal(ConsoleSignal::Open).await;
    assert_eq!(vault.attempt("000000").await, Mode::Unlocked);
}

#[tokio::test(start_paused = true)]
async fn test_zero_tries_recovers_default() {
    let vault = vault_with_image(image("424242", 0)).await;

    assert!(vault.controller.credential().verify(&pin("424242")));
    assert_eq!(vault.controller.credential().max_tries(), 3);
    assert_eq!(vault.stored(), (b"424242".to_vec(), 0));
}

#[tokio::test(start_paused = true)]
async fn test_accelerometer_failure_degrades_to_door_only() {
    let mut vault = vault("123456", 3).await;
    vault.board.motion.set_available(false);

    assert_eq!(vault.controller.step().await.unwrap(), None);
    assert!(vault.controller.is_door_only());

    vault.board.door.open();
    let transition = vault.controller.step().await.unwrap().unwrap();
    assert_eq!(transition.to, Mode::Alarm);
}

#[tokio::test(start_paused = true)]
async fn test_keys_pressed_while_idle_are_discarded() {
    let mut vault = vault("123456", 3).await;
    vault.keys("123").await;
    vault.controller.step().await.unwrap();

    vault.signal(ConsoleSignal::Open).await;
    assert_eq!(vault.attempt("123456").await, Mode::Unlocked);
}

#[tokio::test(start_paused = true)]
async fn test_console_drives_the_vault() {
    let mut vault = vault("123456", 3).await;
    let console = vault.board.console();

    console.handle_line("cfg").await.unwrap();
    vault.controller.step().await.unwrap();
    console.handle_line("123456").await.unwrap();

    vault.controller.step().await.unwrap();
    assert_eq!(vault.controller.mode(), Mode::Configuring(ConfigScreen::ChangePin));
}
