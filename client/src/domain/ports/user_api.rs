//! Driven port for the remote user directory API.
//!
//! The domain owns the operation set and the failure taxonomy so controllers
//! dispatch on error kinds instead of inspecting HTTP status codes.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{User, UserDraft, UserId};

define_port_error! {
    /// Errors surfaced by the user directory API.
    pub enum UserApiError {
        /// No response reached the client.
        Network {
            /// Transport failure description.
            message: String,
        } => "user api unreachable: {message}",
        /// The server answered with a 5xx, an unrecognised 4xx, or an
        /// unusable success response.
        Server {
            /// HTTP status code returned by the server.
            status: u16,
            /// Message taken from the error body, when present.
            server_message: Option<String>,
        } => "user api failed with status {status}",
        /// The addressed user does not exist.
        NotFound {
            /// Message taken from the error body, when present.
            server_message: Option<String>,
        } => "user not found",
        /// The server rejected a create as a duplicate.
        Conflict {
            /// Message taken from the error body, when present.
            server_message: Option<String>,
        } => "user conflicts with an existing record",
    }
}

impl UserApiError {
    /// Message supplied by the server, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Network { .. } => None,
            Self::Server { server_message, .. }
            | Self::NotFound { server_message }
            | Self::Conflict { server_message } => server_message.as_deref(),
        }
    }

    /// Text to show the user: the server message verbatim, else `fallback`.
    ///
    /// # Examples
    /// ```
    /// use client::domain::ports::UserApiError;
    ///
    /// let err = UserApiError::server(500_u16, Some("db down".to_owned()));
    /// assert_eq!(err.user_message("Error adding user"), "db down");
    ///
    /// let err = UserApiError::network("connection refused");
    /// assert_eq!(err.user_message("Error adding user"), "Error adding user");
    /// ```
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_owned()
    }
}

/// Port for the remote user resource.
///
/// Every operation is a single request; retries are the caller's concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserApi: Send + Sync {
    /// Fetch every user in server order.
    async fn list_users(&self) -> Result<Vec<User>, UserApiError>;

    /// Fetch one user.
    async fn get_user(&self, id: &UserId) -> Result<User, UserApiError>;

    /// Create a user from a validated draft.
    ///
    /// A created status is success whatever the body holds; the stored
    /// record is returned only when the server echoed it.
    async fn create_user(&self, draft: &UserDraft) -> Result<Option<User>, UserApiError>;

    /// Replace the editable fields of an existing user.
    async fn update_user(&self, id: &UserId, draft: &UserDraft) -> Result<User, UserApiError>;

    /// Delete a user.
    async fn delete_user(&self, id: &UserId) -> Result<(), UserApiError>;
}
