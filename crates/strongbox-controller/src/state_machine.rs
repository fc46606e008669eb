//! Vault mode state machine.
//!
//! Tracks the current [`Mode`], rejects transitions the vault does not allow
//! and keeps a bounded history of recent transitions for diagnostics.
//!
//! # Valid Transitions
//!
//! - Idle → Authenticating | Alarm
//! - Authenticating → Unlocked | Alarm | Configuring(ChangePin)
//! - Alarm → Idle
//! - Unlocked → Idle
//! - Configuring(s) → Configuring(s.next()) | Alarm
//! - Configuring(ExitConfig) → Idle
//!
//! # Examples
//!
//! ```
//! use strongbox_controller::StateMachine;
//! use strongbox_core::Mode;
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_mode(), Mode::Idle);
//!
//! machine.transition_to(Mode::Authenticating).unwrap();
//! assert!(machine.transition_to(Mode::Idle).is_err());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use strongbox_core::{Error, Mode, Result};

/// Maximum number of transitions kept in history.
const MAX_HISTORY_SIZE: usize = 100;

/// Record of one mode change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeTransition {
    /// The mode transitioned from.
    pub from: Mode,

    /// The mode transitioned to.
    pub to: Mode,

    /// Wall-clock time of the transition.
    pub at: DateTime<Utc>,
}

impl ModeTransition {
    pub fn new(from: Mode, to: Mode) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }
}

/// State machine over the vault modes.
///
/// Not thread-safe; the controller owns it exclusively.
#[derive(Debug)]
pub struct StateMachine {
    /// Current mode of the vault.
    current_mode: Mode,

    /// Recent transitions (limited to MAX_HISTORY_SIZE).
    history: VecDeque<ModeTransition>,
}

impl StateMachine {
    /// Create a new state machine in `Idle`.
    pub fn new() -> Self {
        Self {
            current_mode: Mode::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_mode(&self) -> Mode {
        self.current_mode
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<ModeTransition> {
        &self.history
    }

    /// Transition to a new mode, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the current mode does not
    /// lead to `new_mode`. The machine is left unchanged.
    pub fn transition_to(&mut self, new_mode: Mode) -> Result<ModeTransition> {
        if !self.current_mode.can_transition_to(&new_mode) {
            return Err(Error::InvalidStateTransition {
                from: self.current_mode.to_string(),
                to: new_mode.to_string(),
            });
        }

        let transition = ModeTransition::new(self.current_mode, new_mode);
        self.perform_state_change(new_mode, transition.clone());
        Ok(transition)
    }

    /// Force the machine back to `Idle`, whatever the current mode.
    ///
    /// Used when the controller restarts.
    pub fn reset(&mut self) -> ModeTransition {
        let transition = ModeTransition::new(self.current_mode, Mode::Idle);
        self.perform_state_change(Mode::Idle, transition.clone());
        transition
    }

    fn perform_state_change(&mut self, new_mode: Mode, transition: ModeTransition) {
        self.current_mode = new_mode;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
