//! Screen controllers.
//!
//! A controller owns one screen's state machine. State lives behind a short
//! `std::sync::Mutex` that is never held across an `.await`, so a controller
//! can be shared (`Arc`) between the view and the task awaiting a response.
//! Every response is checked against a liveness flag before it touches
//! state: once the view tears the controller down, late responses are
//! discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::domain::ports::{Notifier, Sleeper, UserApi};

mod form;
mod list;

pub use form::{FormMode, FormPhase, FormSnapshot, LoadOutcome, SubmitOutcome, UserFormController};
pub use list::{
    DeleteConfirmation, DeleteOutcome, ListLoadOutcome, ListPhase, ListSnapshot,
    UserListController, UserRow,
};

/// Default time the success banner stays up before navigating away.
pub const DEFAULT_SUCCESS_DISPLAY: Duration = Duration::from_millis(2_000);

/// Port bundle shared by the screen controllers.
#[derive(Clone)]
pub struct ControllerPorts {
    /// Remote user directory.
    pub api: Arc<dyn UserApi>,
    /// Notification surface.
    pub notifier: Arc<dyn Notifier>,
    /// Timer used for display delays.
    pub sleeper: Arc<dyn Sleeper>,
}

impl ControllerPorts {
    /// Build a strongly-typed controller port bundle.
    pub fn new(
        api: Arc<dyn UserApi>,
        notifier: Arc<dyn Notifier>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            api,
            notifier,
            sleeper,
        }
    }
}

/// Timing configuration for form controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormControllerConfig {
    /// How long the success banner is shown before navigating to the list.
    pub success_display: Duration,
}

impl Default for FormControllerConfig {
    fn default() -> Self {
        Self {
            success_display: DEFAULT_SUCCESS_DISPLAY,
        }
    }
}

/// Tracks whether the owning view is still mounted.
#[derive(Debug)]
struct Liveness(AtomicBool);

impl Liveness {
    fn new() -> Self {
        Self(AtomicBool::new(true))
    }

    fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}
