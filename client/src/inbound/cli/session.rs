//! One interactive CLI session over a set of terminal streams.

use std::future::Future;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{CliError, Command, FieldArgs};
use crate::domain::controllers::{
    ControllerPorts, DeleteOutcome, FormControllerConfig, ListLoadOutcome, LoadOutcome,
    SubmitOutcome, UserFormController, UserListController,
};
use crate::domain::ports::{Sleeper, UserApi};
use crate::domain::{Field, FieldErrors, Route, UserId};
use crate::outbound::notifications::NotificationCentre;

const NOTIFICATION_POLL: Duration = Duration::from_millis(50);

/// Screen mounted by the session, with any values given up front.
enum Screen {
    List,
    Create(FieldArgs),
    Edit(UserId, FieldArgs),
}

impl From<Route> for Screen {
    fn from(route: Route) -> Self {
        match route {
            Route::List => Self::List,
            Route::Add => Self::Create(FieldArgs::default()),
            Route::Edit(id) => Self::Edit(id, FieldArgs::default()),
        }
    }
}

/// Where a form left the session.
enum FormExit {
    Navigate(Route),
    Abort(Route, String),
    Stay,
}

/// CLI session: controllers wired to terminal input and output.
///
/// Screen content goes to `out`; notifications are rendered on `err` as
/// `[success] ...` or `[error] ...` lines.
pub struct Session<R, W, E> {
    ports: ControllerPorts,
    form_config: FormControllerConfig,
    notifications: Arc<NotificationCentre>,
    input: R,
    out: W,
    err: E,
}

impl<R: BufRead, W: Write, E: Write> Session<R, W, E> {
    /// Build a session. `notifications` doubles as the controllers'
    /// notifier.
    pub fn new(
        api: Arc<dyn UserApi>,
        sleeper: Arc<dyn Sleeper>,
        notifications: Arc<NotificationCentre>,
        form_config: FormControllerConfig,
        input: R,
        out: W,
        err: E,
    ) -> Self {
        Self {
            ports: ControllerPorts::new(api, notifications.clone(), sleeper),
            form_config,
            notifications,
            input,
            out,
            err,
        }
    }

    /// Hand back the output streams.
    pub fn into_output(self) -> (W, E) {
        (self.out, self.err)
    }

    /// Run one subcommand, following navigation until a screen settles.
    ///
    /// # Errors
    ///
    /// Returns an error when a request fails, the terminal fails, or input
    /// ends while a form still needs values.
    pub async fn run(&mut self, command: Command) -> Result<(), CliError> {
        match command {
            Command::List => self.navigate(Screen::List).await,
            Command::Add(fields) => self.navigate(Screen::Create(fields)).await,
            Command::Edit { id, fields } => {
                let id = UserId::new(id)?;
                self.navigate(Screen::Edit(id, fields)).await
            }
            Command::Delete { id, yes } => {
                let id = UserId::new(id)?;
                self.delete(&id, yes).await
            }
            Command::Open { route } => {
                let route = Route::parse(&route)?;
                self.navigate(route.into()).await
            }
        }
    }

    async fn navigate(&mut self, first: Screen) -> Result<(), CliError> {
        let mut screen = first;
        let mut aborted = None;
        loop {
            let exit = match screen {
                Screen::List => {
                    self.show_list().await?;
                    break;
                }
                Screen::Create(fields) => {
                    let controller =
                        UserFormController::for_create(self.ports.clone(), self.form_config);
                    self.run_form(&controller, &fields).await?
                }
                Screen::Edit(id, fields) => self.edit(id, &fields).await?,
            };
            match exit {
                FormExit::Navigate(route) => screen = route.into(),
                FormExit::Abort(route, message) => {
                    aborted = Some(message);
                    screen = route.into();
                }
                FormExit::Stay => break,
            }
        }
        aborted.map_or(Ok(()), |message| Err(CliError::Failed(message)))
    }

    async fn show_list(&mut self) -> Result<(), CliError> {
        let controller = UserListController::new(self.ports.clone());
        let outcome = self.drive(controller.load()).await?;
        self.render_list(&controller)?;
        match outcome {
            ListLoadOutcome::Failed(message) => Err(CliError::Failed(message)),
            ListLoadOutcome::Loaded(_) | ListLoadOutcome::Discarded => Ok(()),
        }
    }

    async fn edit(&mut self, id: UserId, fields: &FieldArgs) -> Result<FormExit, CliError> {
        let controller = UserFormController::for_edit(id, self.ports.clone(), self.form_config);
        match self.drive(controller.load()).await? {
            LoadOutcome::Ready => self.run_form(&controller, fields).await,
            LoadOutcome::Abort(route) => {
                let message = "could not load the user to edit".to_owned();
                Ok(FormExit::Abort(route, message))
            }
            LoadOutcome::Ignored | LoadOutcome::Discarded => Ok(FormExit::Stay),
        }
    }

    async fn run_form(
        &mut self,
        controller: &UserFormController,
        supplied: &FieldArgs,
    ) -> Result<FormExit, CliError> {
        for field in Field::ALL {
            if let Some(value) = supplied.get(field) {
                controller.edit_field(field, value);
            }
        }
        let mut to_prompt: Vec<Field> = if supplied.is_empty() {
            Field::ALL.to_vec()
        } else {
            Field::ALL
                .into_iter()
                .filter(|field| supplied.get(*field).is_none())
                .collect()
        };

        loop {
            for field in to_prompt.drain(..) {
                let current = controller.snapshot().draft.get(field).to_owned();
                let value = self.prompt(field.label(), &current)?;
                controller.edit_field(field, value);
            }

            match self.drive(controller.submit()).await? {
                SubmitOutcome::Invalid(errors) => {
                    self.render_field_errors(&errors)?;
                    to_prompt = errors.iter().map(|(field, _)| field).collect();
                }
                SubmitOutcome::Succeeded { user, navigate } => {
                    match user {
                        Some(user) => debug!(user_id = %user.id(), "form saved"),
                        None => debug!("form saved without a returned record"),
                    }
                    return Ok(FormExit::Navigate(navigate));
                }
                SubmitOutcome::Failed {
                    error,
                    navigate: Some(route),
                } => return Ok(FormExit::Abort(route, error.to_string())),
                SubmitOutcome::Failed { navigate: None, .. } => {
                    let errors = controller.snapshot().errors;
                    self.render_field_errors(&errors)?;
                    to_prompt = if errors.is_empty() {
                        Field::ALL.to_vec()
                    } else {
                        errors.iter().map(|(field, _)| field).collect()
                    };
                }
                SubmitOutcome::Ignored | SubmitOutcome::Discarded => return Ok(FormExit::Stay),
            }
        }
    }

    async fn delete(&mut self, id: &UserId, assume_yes: bool) -> Result<(), CliError> {
        let controller = UserListController::new(self.ports.clone());
        if let ListLoadOutcome::Failed(message) = self.drive(controller.load()).await? {
            self.render_list(&controller)?;
            return Err(CliError::Failed(message));
        }
        let Some(confirmation) = controller.request_delete_by_id(id) else {
            return Err(CliError::UnknownUser(id.clone()));
        };

        if !assume_yes && !self.confirm(&confirmation.prompt())? {
            controller.cancel_delete();
            writeln!(self.out, "Cancelled.")?;
            return Ok(());
        }

        match self.drive(controller.confirm_delete()).await? {
            DeleteOutcome::Deleted { refresh, .. } => {
                self.render_list(&controller)?;
                match refresh {
                    ListLoadOutcome::Failed(message) => Err(CliError::Failed(message)),
                    ListLoadOutcome::Loaded(_) | ListLoadOutcome::Discarded => Ok(()),
                }
            }
            DeleteOutcome::Failed { message } => Err(CliError::Failed(message)),
            DeleteOutcome::Ignored | DeleteOutcome::Discarded => Ok(()),
        }
    }

    /// Await `work` while rendering notifications as they are published.
    async fn drive<F: Future>(&mut self, work: F) -> Result<F::Output, CliError> {
        tokio::pin!(work);
        loop {
            tokio::select! {
                output = &mut work => {
                    self.flush_notifications()?;
                    return Ok(output);
                }
                () = tokio::time::sleep(NOTIFICATION_POLL) => self.flush_notifications()?,
            }
        }
    }

    fn flush_notifications(&mut self) -> Result<(), CliError> {
        for entry in self.notifications.drain() {
            writeln!(self.err, "{}", entry.notification)?;
        }
        self.err.flush()?;
        Ok(())
    }

    fn render_list(&mut self, controller: &UserListController) -> Result<(), CliError> {
        let snapshot = controller.snapshot();
        if let Some(error) = &snapshot.error {
            writeln!(self.out, "Could not load users: {error}")?;
            return Ok(());
        }
        if snapshot.rows.is_empty() {
            writeln!(self.out, "No users found.")?;
            return Ok(());
        }
        for row in &snapshot.rows {
            writeln!(
                self.out,
                "{:>3}. {} <{}> | {} | id {}",
                row.sequence,
                row.user.name(),
                row.user.email(),
                row.user.address(),
                row.user.id()
            )?;
        }
        Ok(())
    }

    fn render_field_errors(&mut self, errors: &FieldErrors) -> Result<(), CliError> {
        for (field, message) in errors.iter() {
            writeln!(self.out, "  {}: {message}", field.label())?;
        }
        Ok(())
    }

    /// Ask for a field value. An empty answer keeps `current`.
    fn prompt(&mut self, label: &str, current: &str) -> Result<String, CliError> {
        if current.is_empty() {
            write!(self.out, "{label}: ")?;
        } else {
            write!(self.out, "{label} [{current}]: ")?;
        }
        self.out.flush()?;

        let line = self.read_line()?.ok_or(CliError::InputClosed)?;
        if line.is_empty() {
            Ok(current.to_owned())
        } else {
            Ok(line)
        }
    }

    /// Ask a yes/no question. Anything but `y` or `yes` declines.
    fn confirm(&mut self, question: &str) -> Result<bool, CliError> {
        write!(self.out, "{question} [y/N]: ")?;
        self.out.flush()?;
        let answer = self.read_line()?.unwrap_or_default();
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }

    fn read_line(&mut self) -> Result<Option<String>, CliError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }
}
