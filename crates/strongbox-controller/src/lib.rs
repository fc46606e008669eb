//! Vault access controller.
//!
//! This crate contains the decision logic of the vault: the mode state
//! machine, intrusion detection, identity input, the front panel, the
//! liveness watchdog and the supervisor that ties them together.
//!
//! # Example
//!
//! ```no_run
//! use strongbox_controller::{AccessController, ControllerConfig, Supervisor, watchdog};
//! use strongbox_hardware::board::Peripherals;
//! use strongbox_storage::{AnyEeprom, CredentialStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ControllerConfig::default();
//! let (peripherals, _handles) = Peripherals::simulated();
//! let (eeprom, _) = AnyEeprom::open(None, 1024).await?;
//! let store = CredentialStore::new(eeprom)?;
//! let (heartbeat, monitor) = watchdog(config.timing.watchdog_timeout());
//!
//! let controller = AccessController::new(config, peripherals, store, heartbeat)?;
//! let mut supervisor = Supervisor::new(controller, monitor);
//! supervisor.boot().await;
//! supervisor.run().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod display;
pub mod identity;
pub mod intrusion;
pub mod session;
pub mod state_machine;
pub mod supervisor;
pub mod watchdog;

pub use config::{AlarmConfig, ControllerConfig, IntrusionConfig, TimingConfig};
pub use controller::{AccessController, AttemptOutcome};
pub use display::{Alignment, Panel, Screen, align_text, truncate_text};
pub use identity::{Entry, EntryGuard, IdentityInput, MenuKey};
pub use intrusion::{IntrusionMonitor, Sensing};
pub use session::SessionState;
pub use state_machine::{ModeTransition, StateMachine};
pub use supervisor::{RestartReason, Supervisor, Tick};
pub use watchdog::{Heartbeat, WatchdogMonitor, watchdog};
