//! Per-cycle session state.
//!
//! A cycle starts when `Idle` is left and ends when the controller returns
//! to `Idle`; everything here except the mode history is reset then.

use crate::state_machine::{ModeTransition, StateMachine};
use std::collections::VecDeque;
use strongbox_core::{AuthDestination, ConfigScreen, Mode, Result};

/// Session state owned by the controller.
#[derive(Debug, Default)]
pub struct SessionState {
    machine: StateMachine,
    auth_destination: Option<AuthDestination>,
    remaining_tries: u8,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.machine.current_mode()
    }

    /// Screen the settings menu is on, if configuring.
    pub fn config_cursor(&self) -> Option<ConfigScreen> {
        match self.mode() {
            Mode::Configuring(screen) => Some(screen),
            _ => None,
        }
    }

    pub fn auth_destination(&self) -> Option<AuthDestination> {
        self.auth_destination
    }

    pub fn remaining_tries(&self) -> u8 {
        self.remaining_tries
    }

    /// Enter `Authenticating` towards `destination` with a full set of tries.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` outside `Idle`.
    pub fn begin_authentication(
        &mut self,
        destination: AuthDestination,
        max_tries: u8,
    ) -> Result<ModeTransition> {
        let transition = self.machine.transition_to(Mode::Authenticating)?;
        self.auth_destination = Some(destination);
        self.remaining_tries = max_tries;
        Ok(transition)
    }

    /// Consume one try and return how many are left.
    pub fn record_failed_attempt(&mut self) -> u8 {
        self.remaining_tries = self.remaining_tries.saturating_sub(1);
        self.remaining_tries
    }

    /// Transition to `mode`. Returning to `Idle` ends the cycle.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not allowed.
    pub fn transition_to(&mut self, mode: Mode) -> Result<ModeTransition> {
        let transition = self.machine.transition_to(mode)?;
        if mode == Mode::Idle {
            self.end_cycle();
        }
        Ok(transition)
    }

    /// Return to `Idle` from any mode, discarding the cycle.
    pub fn reset(&mut self) -> ModeTransition {
        self.end_cycle();
        self.machine.reset()
    }

    pub fn history(&self) -> &VecDeque<ModeTransition> {
        self.machine.history()
    }

    fn end_cycle(&mut self) {
        self.auth_destination = None;
        self.remaining_tries = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_authentication_sets_cycle() {
        let mut session = SessionState::new();
        session
            .begin_authentication(AuthDestination::Configure, 3)
            .unwrap();

        assert_eq!(session.mode(), Mode::Authenticating);
        assert_eq!(session.auth_destination(), Some(AuthDestination::Configure));
        assert_eq!(session.remaining_tries(), 3);
    }

    #[test]
    fn test_begin_authentication_outside_idle_fails() {
        let mut session = SessionState::new();
        session.transition_to(Mode::Alarm).unwrap();
        assert!(session.begin_authentication(AuthDestination::Unlock, 3).is_err());
    }

    #[test]
    fn test_failed_attempts_saturate() {
        let mut session = SessionState::new();
        session.begin_authentication(AuthDestination::Unlock, 2).unwrap();

        assert_eq!(session.record_failed_attempt(), 1);
        assert_eq!(session.record_failed_attempt(), 0);
        assert_eq!(session.record_failed_attempt(), 0);
    }

    #[test]
    fn test_returning_to_idle_clears_cycle() {
        let mut session = SessionState::new();
        session.begin_authentication(AuthDestination::Unlock, 3).unwrap();
        session.transition_to(Mode::Unlocked).unwrap();
        session.transition_to(Mode::Idle).unwrap();

        assert_eq!(session.auth_destination(), None);
        assert_eq!(session.remaining_tries(), 0);
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_config_cursor() {
        let mut session = SessionState::new();
        assert_eq!(session.config_cursor(), None);

        session.begin_authentication(AuthDestination::Configure, 3).unwrap();
        session
            .transition_to(Mode::Configuring(ConfigScreen::ChangePin))
            .unwrap();
        assert_eq!(session.config_cursor(), Some(ConfigScreen::ChangePin));
    }

    #[test]
    fn test_reset_discards_cycle() {
        let mut session = SessionState::new();
        session.begin_authentication(AuthDestination::Unlock, 3).unwrap();

        let transition = session.reset();
        assert_eq!(transition.from, Mode::Authenticating);
        assert_eq!(session.mode(), Mode::Idle);
        assert_eq!(session.auth_destination(), None);
    }
}
