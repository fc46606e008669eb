//! Watchdog supervision of the controller.
//!
//! Run with: cargo test --package strongbox-controller --test supervision

mod common;

use common::{pin, supervised};
use strongbox_controller::{RestartReason, Tick};
use strongbox_core::{LockPosition, Mode};
use strongbox_hardware::ConsoleSignal;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_hung_step_restarts_into_idle() {
    let (mut supervisor, board, eeprom) = supervised("123456", 3).await;

    board.signals.send(ConsoleSignal::Open).await.unwrap();
    assert!(matches!(supervisor.tick().await, Tick::Stepped(Some(_))));

    board.keypad.type_keys("123456").await.unwrap();
    board.lock.set_stalled(true);
    for (offset, digit) in b"777777".iter().enumerate() {
        eeprom.poke(offset, *digit);
    }

    let started = Instant::now();
    let tick = supervisor.tick().await;

    assert_eq!(tick, Tick::Restarted(RestartReason::Watchdog));
    assert!(started.elapsed() >= supervisor_timeout());
    assert_eq!(supervisor.restarts(), 1);

    let controller = supervisor.controller();
    assert_eq!(controller.mode(), Mode::Idle);
    assert_eq!(controller.session().auth_destination(), None);
    assert!(controller.credential().verify(&pin("777777")));
    assert!(!board.display.backlight());
}

#[tokio::test(start_paused = true)]
async fn test_controller_usable_after_restart() {
    let (mut supervisor, board, _) = supervised("123456", 3).await;

    board.signals.send(ConsoleSignal::Open).await.unwrap();
    supervisor.tick().await;
    board.keypad.type_keys("123456").await.unwrap();
    board.lock.set_stalled(true);
    assert_eq!(
        supervisor.tick().await,
        Tick::Restarted(RestartReason::Watchdog)
    );

    board.lock.set_stalled(false);
    board.signals.send(ConsoleSignal::Open).await.unwrap();
    supervisor.tick().await;
    board.keypad.type_keys("123456").await.unwrap();
    supervisor.tick().await;

    assert_eq!(supervisor.controller().mode(), Mode::Unlocked);
    assert_eq!(board.lock.position(), LockPosition::Unlocked);
    assert_eq!(supervisor.restarts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_long_idle_never_trips_watchdog() {
    let (mut supervisor, _board, _) = supervised("123456", 3).await;
    let started = Instant::now();

    for _ in 0..400 {
        assert_eq!(supervisor.tick().await, Tick::Stepped(None));
    }

    assert!(started.elapsed() > supervisor_timeout() * 2);
    assert_eq!(supervisor.restarts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dwells_never_trip_watchdog() {
    let (mut supervisor, board, _) = supervised("123456", 3).await;

    board.signals.send(ConsoleSignal::Config).await.unwrap();
    supervisor.tick().await;
    board.keypad.type_keys("123456##*").await.unwrap();
    for _ in 0..4 {
        assert!(matches!(supervisor.tick().await, Tick::Stepped(_)));
    }

    assert_eq!(supervisor.controller().mode(), Mode::Idle);
    assert_eq!(supervisor.restarts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_long_alarm_never_trips_watchdog() {
    let (mut supervisor, board, _) = supervised("123456", 3).await;

    board.signals.send(ConsoleSignal::Movement).await.unwrap();
    supervisor.tick().await;
    for _ in 0..20 {
        board.keypad.type_keys("000000").await.unwrap();
        assert_eq!(supervisor.tick().await, Tick::Stepped(None));
    }

    board.keypad.type_keys("123456").await.unwrap();
    assert!(matches!(supervisor.tick().await, Tick::Stepped(Some(_))));
    assert_eq!(supervisor.controller().mode(), Mode::Idle);
    assert_eq!(supervisor.restarts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_step_restarts_into_idle() {
    let (mut supervisor, board, _) = supervised("123456", 3).await;

    board.signals.send(ConsoleSignal::Open).await.unwrap();
    supervisor.tick().await;
    assert_eq!(supervisor.controller().mode(), Mode::Authenticating);

    board.keypad.set_faulty(true);
    assert_eq!(
        supervisor.tick().await,
        Tick::Restarted(RestartReason::StepFailed)
    );
    assert_eq!(supervisor.restarts(), 1);
    assert_eq!(supervisor.controller().mode(), Mode::Idle);
    assert_eq!(supervisor.controller().session().auth_destination(), None);

    board.keypad.set_faulty(false);
    board.signals.send(ConsoleSignal::Open).await.unwrap();
    supervisor.tick().await;
    board.keypad.type_keys("123456").await.unwrap();
    supervisor.tick().await;
    assert_eq!(supervisor.controller().mode(), Mode::Unlocked);
}

#[tokio::test(start_paused = true)]
async fn test_failed_lock_command_relocks_on_restart() {
    let (mut supervisor, board, _) = supervised("123456", 3).await;

    board.signals.send(ConsoleSignal::Open).await.unwrap();
    supervisor.tick().await;
    board.keypad.type_keys("123456").await.unwrap();
    supervisor.tick().await;
    assert_eq!(board.lock.position(), LockPosition::Unlocked);

    board.lock.fail_next_command();
    assert_eq!(
        supervisor.tick().await,
        Tick::Restarted(RestartReason::StepFailed)
    );

    assert_eq!(supervisor.controller().mode(), Mode::Idle);
    assert_eq!(board.lock.position(), LockPosition::Locked);
    assert_eq!(board.lock.count(LockPosition::Locked), 1);
    assert_eq!(supervisor.restarts(), 1);
}

fn supervisor_timeout() -> std::time::Duration {
    strongbox_controller::ControllerConfig::default()
        .timing
        .watchdog_timeout()
}
