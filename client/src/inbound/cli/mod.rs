//! Terminal front end for the user directory.
//!
//! The CLI drives the same controllers a graphical front end would: each
//! subcommand mounts one screen, and navigation signals returned by the
//! controllers decide which screen is shown next.

use std::io;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::config::ClientSettings;
use crate::domain::{Field, RouteParseError, UserId, UserValidationError};

mod session;

pub use session::Session;

/// `user-directory` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "user-directory",
    about = "List, add, edit, and delete users in a remote directory",
    version
)]
pub struct Cli {
    /// Base URL of the REST API. Overrides `USER_DIRECTORY_API_BASE_URL`.
    #[arg(long = "api-url", value_name = "url", global = true)]
    pub api_url: Option<String>,
    /// Request timeout in milliseconds.
    #[arg(long = "timeout-ms", value_name = "ms", global = true)]
    pub timeout_ms: Option<u64>,
    /// Screen to open.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_overrides(&self, settings: &mut ClientSettings) {
        if let Some(url) = &self.api_url {
            settings.api_base_url = Some(url.clone());
        }
        if let Some(timeout) = self.timeout_ms {
            settings.request_timeout_ms = Some(timeout);
        }
    }
}

/// Subcommands, one per screen.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show every user.
    List,
    /// Create a user. Missing fields are prompted for.
    Add(FieldArgs),
    /// Edit a user. Without field flags every field is prompted for.
    Edit {
        /// Identifier of the user to edit.
        id: String,
        /// Replacement values.
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a user after confirmation.
    Delete {
        /// Identifier of the user to delete.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Open a screen by path: `/`, `/add`, or `/update/user/{id}`.
    Open {
        /// Screen path.
        route: String,
    },
}

/// Field values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct FieldArgs {
    /// Display name.
    #[arg(long)]
    pub name: Option<String>,
    /// Contact email.
    #[arg(long)]
    pub email: Option<String>,
    /// Postal address.
    #[arg(long)]
    pub address: Option<String>,
}

impl FieldArgs {
    /// Value supplied for `field`, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Address => self.address.as_deref(),
        }
    }

    /// Whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_none())
    }
}

/// Errors that end a CLI session.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading the terminal or writing to it failed.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    /// Standard input ended while a form still needed values.
    #[error("input closed before the form was submitted")]
    InputClosed,
    /// The screen path given to `open` is not recognised.
    #[error(transparent)]
    Route(#[from] RouteParseError),
    /// A user identifier given on the command line is malformed.
    #[error("invalid user id: {0}")]
    InvalidId(#[from] UserValidationError),
    /// The user to delete is not in the loaded list.
    #[error("no user with id {0} is listed")]
    UnknownUser(UserId),
    /// A request failed; the message was already shown.
    #[error("{0}")]
    Failed(String),
}
