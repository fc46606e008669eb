//! The vault controller.
//!
//! [`AccessController`] owns every peripheral, the persisted credential and
//! the session. Each call to [`AccessController::step`] runs the handler of
//! the current mode once: an idle poll, one PIN attempt, one menu key, and
//! so on. Handlers feed the watchdog heartbeat on every loop iteration and
//! around every dwell.

use crate::config::ControllerConfig;
use crate::display::{Panel, Screen};
use crate::identity::{Entry, EntryGuard, IdentityInput, MenuKey};
use crate::intrusion::{IntrusionMonitor, Sensing};
use crate::session::SessionState;
use crate::state_machine::ModeTransition;
use crate::watchdog::Heartbeat;
use std::collections::VecDeque;
use std::time::Duration;
use strongbox_core::{
    AuthDestination, ConfigScreen, Credential, Error, Identity, LockPosition, Mode, Result,
};
use strongbox_hardware::board::Peripherals;
use strongbox_hardware::devices::AnyLockActuator;
use strongbox_hardware::{ConsoleSignal, Led, LockActuator};
use strongbox_storage::{AnyEeprom, CredentialStore};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

/// Result of one PIN attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The PIN matched the stored one.
    Matched,
    /// The PIN did not match.
    Retry,
    /// An intrusion interrupted the entry.
    Preempted,
}

/// Vault access controller.
#[derive(Debug)]
pub struct AccessController {
    config: ControllerConfig,
    identity: IdentityInput,
    intrusion: IntrusionMonitor,
    panel: Panel,
    lock: AnyLockActuator,
    store: CredentialStore<AnyEeprom>,
    credential: Credential,
    session: SessionState,
    heartbeat: Heartbeat,
    /// Last position the bolt was commanded to. Set to `Unlocked` before an
    /// unlock command is sent.
    bolt: LockPosition,
}

impl AccessController {
    /// Assemble a controller. Nothing is touched until [`boot`](Self::boot).
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(
        config: ControllerConfig,
        peripherals: Peripherals,
        store: CredentialStore<AnyEeprom>,
        heartbeat: Heartbeat,
    ) -> Result<Self> {
        config.validate()?;

        let Peripherals {
            keypad,
            tag_reader,
            door,
            motion,
            lock,
            display,
            indicator,
            signals,
        } = peripherals;

        Ok(Self {
            identity: IdentityInput::new(keypad, tag_reader, signals),
            intrusion: IntrusionMonitor::new(door, motion, config.intrusion.movement_sensitivity),
            panel: Panel::new(display, indicator),
            lock,
            store,
            credential: Credential::default(),
            session: SessionState::new(),
            heartbeat,
            bolt: LockPosition::Locked,
            config,
        })
    }

    /// Bring up the peripherals and enter `Idle`.
    pub async fn boot(&mut self) {
        info!(version = strongbox_core::VERSION, "Booting vault controller");
        self.restart().await;
    }

    /// Discard the session and start over in `Idle`, as after a power cycle.
    ///
    /// The bolt is relocked if it may have been left unlocked, and the
    /// credential is reloaded from storage.
    pub async fn restart(&mut self) {
        let transition = self.session.reset();
        debug!(from = %transition.from, "Session reset");
        self.heartbeat.feed();

        if self.bolt == LockPosition::Unlocked {
            warn!("Bolt may be unlocked, relocking");
            let limit = self.config.timing.watchdog_timeout();
            match timeout(limit, self.command_lock(LockPosition::Locked)).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => error!(error = %error, "Relocking failed"),
                Err(_) => error!(timeout = ?limit, "Relocking timed out"),
            }
            self.heartbeat.feed();
        }

        self.credential = self.store.load_or_recover().await;
        self.identity.initialize().await;
        self.intrusion.initialize().await;
        self.intrusion.resync().await;
        self.panel.quiet().await;
        self.panel.blank().await;
        self.heartbeat.feed();

        info!(
            max_tries = self.credential.max_tries(),
            door_only = self.intrusion.is_degraded(),
            "Controller ready"
        );
    }

    /// Run the current mode's handler once.
    ///
    /// Returns the transition taken, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a peripheral the decision depends on fails. The
    /// supervisor restarts the controller on error.
    pub async fn step(&mut self) -> Result<Option<ModeTransition>> {
        self.heartbeat.feed();

        match self.session.mode() {
            Mode::Idle => self.step_idle().await,
            Mode::Authenticating => self.step_authenticating().await,
            Mode::Alarm => self.step_alarm().await,
            Mode::Unlocked => self.step_unlocked().await,
            Mode::Configuring(screen) => self.step_configuring(screen).await,
        }
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn history(&self) -> &VecDeque<ModeTransition> {
        self.session.history()
    }

    /// Whether intrusion sensing runs on the door switch only.
    pub fn is_door_only(&self) -> bool {
        self.intrusion.is_degraded()
    }

    async fn step_idle(&mut self) -> Result<Option<ModeTransition>> {
        if let Some(signal) = self.identity.poll_signal().await? {
            debug!(?signal, "Console signal");
            let transition = match signal {
                ConsoleSignal::Open => self.begin_authentication(AuthDestination::Unlock)?,
                ConsoleSignal::Config => self.begin_authentication(AuthDestination::Configure)?,
                ConsoleSignal::Movement => {
                    warn!("Movement reported on console");
                    self.enter_alarm().await?
                }
            };
            return Ok(Some(transition));
        }

        if let Identity::Tag(tag) = self.identity.read_tag().await {
            match self.config.tags.classify(&tag) {
                Some(destination) => {
                    info!(%tag, %destination, "Tag accepted");
                    return self.begin_authentication(destination).map(Some);
                }
                None => debug!(%tag, "Ignoring unknown tag"),
            }
        }

        if self.intrusion.poll().await {
            warn!("Intrusion detected while idle");
            return self.enter_alarm().await.map(Some);
        }

        self.identity.discard_keys().await?;
        sleep(self.config.timing.poll_interval()).await;
        Ok(None)
    }

    async fn step_authenticating(&mut self) -> Result<Option<ModeTransition>> {
        match self.attempt().await? {
            AttemptOutcome::Matched => match self.session.auth_destination() {
                Some(AuthDestination::Unlock) => self.enter_unlocked().await.map(Some),
                Some(AuthDestination::Configure) => self.enter_configuring().await.map(Some),
                None => Err(Error::InvalidStateTransition {
                    from: Mode::Authenticating.to_string(),
                    to: "unknown destination".into(),
                }),
            },
            AttemptOutcome::Retry => {
                let remaining = self.session.record_failed_attempt();
                if remaining == 0 {
                    warn!("Wrong PIN, no attempts left");
                    self.enter_alarm().await.map(Some)
                } else {
                    info!(remaining, "Wrong PIN");
                    Ok(None)
                }
            }
            AttemptOutcome::Preempted => {
                warn!("Intrusion during PIN entry");
                self.enter_alarm().await.map(Some)
            }
        }
    }

    /// Read one PIN with full intrusion sensing and compare it.
    async fn attempt(&mut self) -> Result<AttemptOutcome> {
        self.panel.show(Screen::EnterPin).await;

        let mut guard = EntryGuard {
            panel: &mut self.panel,
            intrusion: &mut self.intrusion,
            heartbeat: &self.heartbeat,
            timing: &self.config.timing,
            sensing: Sensing::Full,
            duress: None,
        };

        Ok(match self.identity.read_pin(&mut guard).await? {
            Entry::Complete(pin) if self.credential.verify(&pin) => AttemptOutcome::Matched,
            Entry::Complete(_) => AttemptOutcome::Retry,
            Entry::Preempted => AttemptOutcome::Preempted,
        })
    }

    async fn step_alarm(&mut self) -> Result<Option<ModeTransition>> {
        self.panel.show(Screen::Alarm).await;

        let mut guard = EntryGuard {
            panel: &mut self.panel,
            intrusion: &mut self.intrusion,
            heartbeat: &self.heartbeat,
            timing: &self.config.timing,
            sensing: Sensing::Off,
            duress: Some(&self.config.alarm),
        };

        match self.identity.read_pin(&mut guard).await? {
            Entry::Complete(pin) if self.credential.verify(&pin) => {
                info!("Alarm disabled");
                self.panel.quiet().await;
                self.panel.show(Screen::AlarmDisabled).await;
                self.dwell(self.config.timing.alarm_cleared()).await;
                self.intrusion.resync().await;
                self.enter_idle().await.map(Some)
            }
            _ => {
                info!("Wrong PIN while alarm is active");
                Ok(None)
            }
        }
    }

    async fn step_unlocked(&mut self) -> Result<Option<ModeTransition>> {
        if !self.intrusion.door_closed().await {
            sleep(self.config.timing.poll_interval()).await;
            return Ok(None);
        }

        self.panel.set_led(Led::Green, false).await;
        self.panel.show(Screen::DoorLocked).await;
        self.dwell(self.config.timing.lock_settle()).await;
        self.command_lock(LockPosition::Locked).await?;
        self.dwell(self.config.timing.lock_dwell()).await;
        self.enter_idle().await.map(Some)
    }

    async fn step_configuring(&mut self, screen: ConfigScreen) -> Result<Option<ModeTransition>> {
        self.panel.show(Screen::Menu(screen)).await;

        loop {
            self.heartbeat.feed();

            if self.intrusion.poll_door().await {
                warn!(%screen, "Intrusion in settings menu");
                return self.enter_alarm().await.map(Some);
            }

            match self.identity.poll_menu_key().await? {
                Some(MenuKey::Next) => {
                    return self.transition_to(Mode::Configuring(screen.next())).map(Some);
                }
                Some(MenuKey::Confirm) => return self.confirm(screen).await,
                None => sleep(self.config.timing.poll_interval()).await,
            }
        }
    }

    async fn confirm(&mut self, screen: ConfigScreen) -> Result<Option<ModeTransition>> {
        match screen {
            ConfigScreen::ChangePin => self.change_pin().await,
            ConfigScreen::ChangeTries => self.change_tries().await,
            ConfigScreen::ExitConfig => {
                self.panel.show(Screen::ExitingSettings).await;
                self.dwell(self.config.timing.banner()).await;
                self.enter_idle().await.map(Some)
            }
        }
    }

    async fn change_pin(&mut self) -> Result<Option<ModeTransition>> {
        self.panel.show(Screen::EnterNewPin).await;

        let mut guard = EntryGuard {
            panel: &mut self.panel,
            intrusion: &mut self.intrusion,
            heartbeat: &self.heartbeat,
            timing: &self.config.timing,
            sensing: Sensing::DoorOnly,
            duress: None,
        };

        match self.identity.read_pin(&mut guard).await? {
            Entry::Complete(pin) => {
                let updated = self.credential.clone().with_pin(pin);
                self.persist(updated).await;
                Ok(None)
            }
            Entry::Preempted => {
                warn!("Intrusion while entering new PIN");
                self.enter_alarm().await.map(Some)
            }
        }
    }

    async fn change_tries(&mut self) -> Result<Option<ModeTransition>> {
        self.panel.show(Screen::EnterTries).await;

        let mut guard = EntryGuard {
            panel: &mut self.panel,
            intrusion: &mut self.intrusion,
            heartbeat: &self.heartbeat,
            timing: &self.config.timing,
            sensing: Sensing::DoorOnly,
            duress: None,
        };

        match self.identity.read_tries(&mut guard).await? {
            Entry::Complete(value) => {
                match self.credential.clone().with_max_tries(value) {
                    Ok(updated) => self.persist(updated).await,
                    Err(error) => {
                        info!(error = %error, "Tries value rejected");
                        self.panel.show(Screen::InvalidValue).await;
                        self.dwell(self.config.timing.warning()).await;
                    }
                }
                Ok(None)
            }
            Entry::Preempted => {
                warn!("Intrusion while entering tries");
                self.enter_alarm().await.map(Some)
            }
        }
    }

    /// Save `updated` and adopt it only if the write succeeded.
    async fn persist(&mut self, updated: Credential) {
        match self.store.save(&updated).await {
            Ok(()) => {
                info!(max_tries = updated.max_tries(), "Credential saved");
                self.credential = updated;
                self.panel.show(Screen::Saved).await;
            }
            Err(error) => {
                error!(error = %error, "Saving credential failed, keeping previous one");
                self.panel.show(Screen::SaveFailed).await;
            }
        }
        self.dwell(self.config.timing.warning()).await;
    }

    fn begin_authentication(&mut self, destination: AuthDestination) -> Result<ModeTransition> {
        let transition = self
            .session
            .begin_authentication(destination, self.credential.max_tries())?;
        log_transition(&transition);
        Ok(transition)
    }

    fn transition_to(&mut self, mode: Mode) -> Result<ModeTransition> {
        let transition = self.session.transition_to(mode)?;
        log_transition(&transition);
        Ok(transition)
    }

    async fn enter_idle(&mut self) -> Result<ModeTransition> {
        let transition = self.transition_to(Mode::Idle)?;
        self.panel.blank().await;
        Ok(transition)
    }

    async fn enter_alarm(&mut self) -> Result<ModeTransition> {
        let transition = self.transition_to(Mode::Alarm)?;
        self.panel.show(Screen::Alarm).await;
        Ok(transition)
    }

    async fn enter_unlocked(&mut self) -> Result<ModeTransition> {
        let transition = self.transition_to(Mode::Unlocked)?;
        self.panel.show(Screen::DoorUnlocked).await;
        self.panel.set_led(Led::Green, true).await;
        self.command_lock(LockPosition::Unlocked).await?;
        self.dwell(self.config.timing.unlock_dwell()).await;
        Ok(transition)
    }

    async fn enter_configuring(&mut self) -> Result<ModeTransition> {
        let transition = self.transition_to(Mode::Configuring(ConfigScreen::ChangePin))?;
        self.panel.show(Screen::SettingsMenu).await;
        self.dwell(self.config.timing.banner()).await;
        Ok(transition)
    }

    async fn command_lock(&mut self, position: LockPosition) -> Result<()> {
        if position == LockPosition::Unlocked {
            self.bolt = LockPosition::Unlocked;
        }
        self.lock.set_position(position).await?;
        self.bolt = position;
        info!(%position, "Bolt commanded");
        Ok(())
    }

    async fn dwell(&self, duration: Duration) {
        self.heartbeat.feed();
        sleep(duration).await;
        self.heartbeat.feed();
    }
}

fn log_transition(transition: &ModeTransition) {
    info!(from = %transition.from, to = %transition.to, "Mode transition");
}
