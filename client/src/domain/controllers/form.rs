//! Form controller behind the create and edit screens.
//!
//! ```text
//! Loading ──load ok──▶ Editing ──submit (valid)──▶ Submitting ──ok──▶ SubmitSucceeded
//!    │                   ▲   │                          │
//!    └──load failed──▶ Aborted  └─submit (invalid)─┘     └──failed──▶ Editing
//! ```
//!
//! Validation runs synchronously inside `submit`, and a failed submission
//! lands back in `Editing`, so neither state is stored.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::{ControllerPorts, FormControllerConfig, Liveness};
use crate::domain::ports::UserApiError;
use crate::domain::validation::{FieldErrors, validate};
use crate::domain::{Field, Notification, Route, User, UserDraft, UserId};

const FETCH_FALLBACK: &str = "Error fetching user";
const CREATE_FALLBACK: &str = "Error adding user";
const UPDATE_FALLBACK: &str = "Error updating user";
const CONFLICT_FALLBACK: &str = "User already exists";
const MISSING_FALLBACK: &str = "User not found";

/// Which screen the form backs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// Create a new user.
    Create,
    /// Edit the user with this identifier.
    Edit(UserId),
}

/// Observable form state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Fetching the record to edit.
    Loading,
    /// Inputs are enabled.
    Editing,
    /// A create or update request is in flight; inputs are disabled.
    Submitting,
    /// The request succeeded; the view is about to leave.
    SubmitSucceeded,
    /// The form cannot continue and the view should leave.
    Aborted,
}

/// Result of [`UserFormController::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The draft is ready for editing.
    Ready,
    /// The record could not be fetched; navigate to the route.
    Abort(Route),
    /// The form was not waiting for a load.
    Ignored,
    /// The controller was torn down before the response arrived.
    Discarded,
}

/// Result of [`UserFormController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; no request was sent.
    Invalid(FieldErrors),
    /// The form was not accepting a submission, for example one is in flight.
    Ignored,
    /// The record was saved and the success banner has been shown.
    Succeeded {
        /// Record as returned by the server, when it echoed one.
        user: Option<User>,
        /// Screen to show next.
        navigate: Route,
    },
    /// The request failed; the form is editable again unless `navigate` is set.
    Failed {
        /// Failure returned by the API.
        error: UserApiError,
        /// Screen to show next, when the failure makes the form unusable.
        navigate: Option<Route>,
    },
    /// The controller was torn down before the response arrived.
    Discarded,
}

/// Copy of the form state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    /// Current phase.
    pub phase: FormPhase,
    /// Current field values.
    pub draft: UserDraft,
    /// Current field errors.
    pub errors: FieldErrors,
}

impl FormSnapshot {
    /// Whether inputs and the submit control accept interaction.
    pub fn inputs_enabled(&self) -> bool {
        self.phase == FormPhase::Editing
    }
}

#[derive(Debug)]
struct FormState {
    phase: FormPhase,
    draft: UserDraft,
    errors: FieldErrors,
}

/// State machine for the create and edit screens.
pub struct UserFormController {
    mode: FormMode,
    ports: ControllerPorts,
    config: FormControllerConfig,
    state: Mutex<FormState>,
    liveness: Liveness,
}

impl UserFormController {
    /// Controller for the create screen, starting in `Editing` with an empty
    /// draft.
    pub fn for_create(ports: ControllerPorts, config: FormControllerConfig) -> Self {
        Self::with_phase(FormMode::Create, FormPhase::Editing, ports, config)
    }

    /// Controller for the edit screen, starting in `Loading`. Call
    /// [`Self::load`] to hydrate the draft.
    pub fn for_edit(id: UserId, ports: ControllerPorts, config: FormControllerConfig) -> Self {
        Self::with_phase(FormMode::Edit(id), FormPhase::Loading, ports, config)
    }

    fn with_phase(
        mode: FormMode,
        phase: FormPhase,
        ports: ControllerPorts,
        config: FormControllerConfig,
    ) -> Self {
        Self {
            mode,
            ports,
            config,
            state: Mutex::new(FormState {
                phase,
                draft: UserDraft::default(),
                errors: FieldErrors::new(),
            }),
            liveness: Liveness::new(),
        }
    }

    /// Screen this controller backs.
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Current phase.
    pub fn phase(&self) -> FormPhase {
        self.lock_state().phase
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.lock_state();
        FormSnapshot {
            phase: state.phase,
            draft: state.draft.clone(),
            errors: state.errors.clone(),
        }
    }

    /// Whether the owning view is still mounted.
    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Fetch the record being edited and hydrate the draft.
    ///
    /// On failure the error is surfaced as a notification and the form
    /// aborts towards the list.
    pub async fn load(&self) -> LoadOutcome {
        let FormMode::Edit(id) = &self.mode else {
            return LoadOutcome::Ignored;
        };
        if self.lock_state().phase != FormPhase::Loading {
            return LoadOutcome::Ignored;
        }

        debug!(user_id = %id, "loading user for edit");
        let result = self.ports.api.get_user(id).await;
        if !self.is_alive() {
            debug!(user_id = %id, "edit form torn down before load completed");
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(user) => {
                let mut state = self.lock_state();
                state.draft = user.to_draft();
                state.errors = FieldErrors::new();
                state.phase = FormPhase::Editing;
                LoadOutcome::Ready
            }
            Err(error) => {
                warn!(user_id = %id, %error, "failed to load user for edit");
                self.lock_state().phase = FormPhase::Aborted;
                self.notify_error(error.user_message(FETCH_FALLBACK));
                LoadOutcome::Abort(Route::List)
            }
        }
    }

    /// Update one field of the draft.
    ///
    /// Clears that field's error and leaves the others alone. Returns
    /// `false` when inputs are disabled.
    pub fn edit_field(&self, field: Field, value: impl Into<String>) -> bool {
        let mut state = self.lock_state();
        if state.phase != FormPhase::Editing {
            return false;
        }
        state.draft.set(field, value);
        state.errors.clear(field);
        true
    }

    /// Validate and submit the draft.
    ///
    /// At most one request is in flight: calls made while `Submitting` are
    /// ignored.
    pub async fn submit(&self) -> SubmitOutcome {
        let draft = {
            let mut state = self.lock_state();
            if state.phase != FormPhase::Editing {
                return SubmitOutcome::Ignored;
            }
            let errors = validate(&state.draft);
            if !errors.is_empty() {
                debug!(invalid_fields = errors.len(), "draft failed validation");
                state.errors = errors.clone();
                return SubmitOutcome::Invalid(errors);
            }
            state.errors = FieldErrors::new();
            state.phase = FormPhase::Submitting;
            state.draft.clone()
        };

        let result = match &self.mode {
            FormMode::Create => self.ports.api.create_user(&draft).await,
            FormMode::Edit(id) => self.ports.api.update_user(id, &draft).await.map(Some),
        };
        if !self.is_alive() {
            debug!("form torn down before submission completed");
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(user) => self.complete_submission(user, &draft).await,
            Err(error) => self.fail_submission(error),
        }
    }

    /// Leave the edit screen without saving.
    ///
    /// Returns the list route for edit forms and `None` for the create form,
    /// which has no cancel control. The draft is discarded and any response
    /// still in flight will be ignored.
    pub fn cancel(&self) -> Option<Route> {
        if self.mode == FormMode::Create {
            return None;
        }
        self.teardown();
        let mut state = self.lock_state();
        state.draft = UserDraft::default();
        state.errors = FieldErrors::new();
        state.phase = FormPhase::Aborted;
        Some(Route::List)
    }

    /// Mark the owning view as gone. Later responses become no-ops.
    pub fn teardown(&self) {
        self.liveness.kill();
    }

    async fn complete_submission(&self, user: Option<User>, draft: &UserDraft) -> SubmitOutcome {
        self.lock_state().phase = FormPhase::SubmitSucceeded;
        let verb = match self.mode {
            FormMode::Create => "added",
            FormMode::Edit(_) => "updated",
        };
        let name = match &user {
            Some(saved) => {
                debug!(user_id = %saved.id(), verb, "user saved");
                saved.name()
            }
            None => {
                debug!(verb, "user saved without a returned record");
                draft.name.as_str()
            }
        };
        self.ports.notifier.notify(Notification::success(format!(
            "User \"{name}\" {verb} successfully"
        )));

        self.ports.sleeper.sleep(self.config.success_display).await;
        if !self.is_alive() {
            return SubmitOutcome::Discarded;
        }
        SubmitOutcome::Succeeded {
            user,
            navigate: Route::List,
        }
    }

    fn fail_submission(&self, error: UserApiError) -> SubmitOutcome {
        warn!(%error, "user submission failed");
        let mut state = self.lock_state();
        state.phase = FormPhase::Editing;

        let navigate = match (&self.mode, &error) {
            (FormMode::Create, UserApiError::Conflict { .. }) => {
                let message = error.user_message(CONFLICT_FALLBACK);
                state.errors.insert(Field::Email, message.clone());
                drop(state);
                self.notify_error(message);
                None
            }
            (FormMode::Edit(_), UserApiError::NotFound { .. }) => {
                state.phase = FormPhase::Aborted;
                drop(state);
                self.notify_error(error.user_message(MISSING_FALLBACK));
                Some(Route::List)
            }
            (FormMode::Create, _) => {
                drop(state);
                self.notify_error(error.user_message(CREATE_FALLBACK));
                None
            }
            (FormMode::Edit(_), _) => {
                drop(state);
                self.notify_error(error.user_message(UPDATE_FALLBACK));
                None
            }
        };

        SubmitOutcome::Failed { error, navigate }
    }

    fn notify_error(&self, message: String) {
        self.ports.notifier.notify(Notification::error(message));
    }

    fn lock_state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
