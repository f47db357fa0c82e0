//! List controller behind the user list screen, including the delete
//! confirmation workflow.
//!
//! The collection is never patched locally: after a successful delete the
//! controller refetches, so the server stays the source of truth.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::{ControllerPorts, Liveness};
use crate::domain::{Notification, User, UserId};

const LIST_FALLBACK: &str = "Error fetching users";
const DELETE_FALLBACK: &str = "Error deleting user";

/// Observable list state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    /// The first fetch has not completed.
    Loading,
    /// The collection is available.
    Loaded,
    /// The last fetch failed.
    LoadFailed,
}

/// One displayed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    /// 1-based position in the server response. Display only.
    pub sequence: usize,
    /// The user shown in the row.
    pub user: User,
}

/// Open delete confirmation for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    target_id: UserId,
    target_name: String,
}

impl DeleteConfirmation {
    /// Identifier of the user to delete.
    pub fn target_id(&self) -> &UserId {
        &self.target_id
    }

    /// Display name of the user to delete.
    pub fn target_name(&self) -> &str {
        self.target_name.as_str()
    }

    /// Question shown in the confirmation dialog.
    ///
    /// # Examples
    /// ```
    /// use client::domain::controllers::DeleteConfirmation;
    /// use client::domain::{User, UserDraft, UserId};
    ///
    /// let user = User::new(UserId::new("42").expect("id"), UserDraft::new("Jane", "j@x.io", "x"));
    /// let confirmation = DeleteConfirmation::for_user(&user);
    /// assert_eq!(confirmation.prompt(), "Are you sure you want to delete user \"Jane\"?");
    /// ```
    pub fn prompt(&self) -> String {
        if self.target_name.trim().is_empty() {
            "Are you sure you want to delete this user?".to_owned()
        } else {
            format!(
                "Are you sure you want to delete user \"{}\"?",
                self.target_name
            )
        }
    }

    /// Confirmation targeting `user`.
    pub fn for_user(user: &User) -> Self {
        Self {
            target_id: user.id().clone(),
            target_name: user.name().to_owned(),
        }
    }
}

/// Result of [`UserListController::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListLoadOutcome {
    /// The collection was replaced; carries the row count.
    Loaded(usize),
    /// The fetch failed; carries the message shown inline.
    Failed(String),
    /// The controller was torn down before the response arrived.
    Discarded,
}

/// Result of [`UserListController::confirm_delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No confirmation was open, or a delete is already in flight.
    Ignored,
    /// The user was deleted and the list refetched.
    Deleted {
        /// Display name of the deleted user.
        name: String,
        /// Result of the refetch that followed.
        refresh: ListLoadOutcome,
    },
    /// The delete failed; the collection is unchanged.
    Failed {
        /// Message shown in the notification.
        message: String,
    },
    /// The controller was torn down before the response arrived.
    Discarded,
}

/// Copy of the list state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    /// Current phase.
    pub phase: ListPhase,
    /// Rows in display order.
    pub rows: Vec<UserRow>,
    /// Inline error from the last failed fetch.
    pub error: Option<String>,
    /// Open delete confirmation.
    pub confirmation: Option<DeleteConfirmation>,
    /// Whether a delete request is in flight.
    pub delete_in_flight: bool,
}

#[derive(Debug)]
struct ListState {
    phase: ListPhase,
    users: Vec<User>,
    error: Option<String>,
    confirmation: Option<DeleteConfirmation>,
    delete_in_flight: bool,
}

/// State machine for the user list screen.
pub struct UserListController {
    ports: ControllerPorts,
    state: Mutex<ListState>,
    liveness: Liveness,
}

impl UserListController {
    /// Controller in `Loading`. Call [`Self::load`] on mount.
    pub fn new(ports: ControllerPorts) -> Self {
        Self {
            ports,
            state: Mutex::new(ListState {
                phase: ListPhase::Loading,
                users: Vec::new(),
                error: None,
                confirmation: None,
                delete_in_flight: false,
            }),
            liveness: Liveness::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ListPhase {
        self.lock_state().phase
    }

    /// Rows in server order with 1-based sequence numbers.
    pub fn rows(&self) -> Vec<UserRow> {
        numbered(&self.lock_state().users)
    }

    /// Open delete confirmation, if any.
    pub fn confirmation(&self) -> Option<DeleteConfirmation> {
        self.lock_state().confirmation.clone()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ListSnapshot {
        let state = self.lock_state();
        ListSnapshot {
            phase: state.phase,
            rows: numbered(&state.users),
            error: state.error.clone(),
            confirmation: state.confirmation.clone(),
            delete_in_flight: state.delete_in_flight,
        }
    }

    /// Whether the owning view is still mounted.
    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Fetch the collection, replacing whatever is shown.
    ///
    /// A failure is shown inline and as a notification.
    pub async fn load(&self) -> ListLoadOutcome {
        debug!("loading user list");
        let result = self.ports.api.list_users().await;
        if !self.is_alive() {
            debug!("user list torn down before load completed");
            return ListLoadOutcome::Discarded;
        }

        match result {
            Ok(users) => {
                let count = users.len();
                let mut state = self.lock_state();
                state.users = users;
                state.error = None;
                state.phase = ListPhase::Loaded;
                ListLoadOutcome::Loaded(count)
            }
            Err(error) => {
                warn!(%error, "failed to load user list");
                let message = error.user_message(LIST_FALLBACK);
                {
                    let mut state = self.lock_state();
                    state.error = Some(message.clone());
                    state.phase = ListPhase::LoadFailed;
                }
                self.ports
                    .notifier
                    .notify(Notification::error(message.clone()));
                ListLoadOutcome::Failed(message)
            }
        }
    }

    /// Open the delete confirmation for `user`. No request is sent.
    ///
    /// Returns `None` while another delete is in flight.
    pub fn request_delete(&self, user: &User) -> Option<DeleteConfirmation> {
        let mut state = self.lock_state();
        if state.delete_in_flight {
            return None;
        }
        let confirmation = DeleteConfirmation::for_user(user);
        state.confirmation = Some(confirmation.clone());
        Some(confirmation)
    }

    /// Open the delete confirmation for the loaded user with `id`.
    ///
    /// Returns `None` when no such row is shown or a delete is in flight.
    pub fn request_delete_by_id(&self, id: &UserId) -> Option<DeleteConfirmation> {
        let user = self
            .lock_state()
            .users
            .iter()
            .find(|user| user.id() == id)
            .cloned()?;
        self.request_delete(&user)
    }

    /// Close the confirmation without deleting.
    ///
    /// Returns `false` when nothing was open or the delete is already in
    /// flight.
    pub fn cancel_delete(&self) -> bool {
        let mut state = self.lock_state();
        if state.delete_in_flight {
            return false;
        }
        state.confirmation.take().is_some()
    }

    /// Delete the confirmed user, then refetch the list.
    ///
    /// The confirmation closes whatever the result. On failure the collection
    /// stays as it was until the next load.
    pub async fn confirm_delete(&self) -> DeleteOutcome {
        let target = {
            let mut state = self.lock_state();
            if state.delete_in_flight {
                return DeleteOutcome::Ignored;
            }
            let Some(target) = state.confirmation.clone() else {
                return DeleteOutcome::Ignored;
            };
            state.delete_in_flight = true;
            target
        };

        debug!(user_id = %target.target_id(), "deleting user");
        let result = self.ports.api.delete_user(target.target_id()).await;
        if !self.is_alive() {
            debug!("user list torn down before delete completed");
            return DeleteOutcome::Discarded;
        }

        {
            let mut state = self.lock_state();
            state.delete_in_flight = false;
            state.confirmation = None;
        }

        match result {
            Ok(()) => {
                let name = target.target_name().to_owned();
                self.ports.notifier.notify(Notification::success(format!(
                    "User \"{name}\" deleted successfully"
                )));
                let refresh = self.load().await;
                DeleteOutcome::Deleted { name, refresh }
            }
            Err(error) => {
                warn!(user_id = %target.target_id(), %error, "failed to delete user");
                let message = error.user_message(DELETE_FALLBACK);
                self.ports
                    .notifier
                    .notify(Notification::error(message.clone()));
                DeleteOutcome::Failed { message }
            }
        }
    }

    /// Mark the owning view as gone. Later responses become no-ops.
    pub fn teardown(&self) {
        self.liveness.kill();
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn numbered(users: &[User]) -> Vec<UserRow> {
    users
        .iter()
        .enumerate()
        .map(|(index, user)| UserRow {
            sequence: index + 1,
            user: user.clone(),
        })
        .collect()
}
