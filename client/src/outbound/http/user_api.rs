//! Reqwest-backed user directory adapter.
//!
//! This adapter owns transport details only: URL construction, JSON
//! encoding, status-to-error mapping, and decoding into domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::dto::{SavedUserDto, error_message};
use crate::domain::ports::{UserApi, UserApiError};
use crate::domain::{User, UserDraft, UserId};

/// Errors raised while constructing [`HttpUserApi`].
#[derive(Debug, Error)]
pub enum HttpUserApiBuildError {
    /// The base URL cannot carry path segments (for example `mailto:`).
    #[error("base url {0} cannot carry path segments")]
    UnusableBaseUrl(Url),
    /// The reqwest client could not be built.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Self::List => "list_users",
            Self::Get => "get_user",
            Self::Create => "create_user",
            Self::Update => "update_user",
            Self::Delete => "delete_user",
        }
    }

    fn method(self) -> Method {
        match self {
            Self::List | Self::Get => Method::GET,
            Self::Create => Method::POST,
            Self::Update => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }

    fn expected_status(self) -> StatusCode {
        match self {
            Self::Create => StatusCode::CREATED,
            Self::List | Self::Get | Self::Update | Self::Delete => StatusCode::OK,
        }
    }

    fn addresses_one_user(self) -> bool {
        matches!(self, Self::Get | Self::Update | Self::Delete)
    }
}

/// User directory adapter issuing one HTTP request per operation.
///
/// Paths are resolved below the base URL: `GET users`, `GET user/{id}`,
/// `POST create/user`, `PUT update/user/{id}`, `DELETE delete/user/{id}`.
#[derive(Debug, Clone)]
pub struct HttpUserApi {
    client: Client,
    base_url: Url,
}

impl HttpUserApi {
    /// Build an adapter relying on the transport's default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn new(base_url: Url) -> Result<Self, HttpUserApiBuildError> {
        Self::with_timeout(base_url, None)
    }

    /// Build an adapter with an optional whole-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn with_timeout(
        base_url: Url,
        timeout: Option<Duration>,
    ) -> Result<Self, HttpUserApiBuildError> {
        if base_url.cannot_be_a_base() {
            return Err(HttpUserApiBuildError::UnusableBaseUrl(base_url));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Base endpoint every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        operation: Operation,
        url: Url,
        body: Option<&UserDraft>,
    ) -> Result<(StatusCode, Vec<u8>), UserApiError> {
        debug!(
            operation = operation.name(),
            method = %operation.method(),
            url = %url,
            "sending user api request"
        );
        let mut request = self
            .client
            .request(operation.method(), url)
            .header(ACCEPT, "application/json");
        if let Some(draft) = body {
            request = request.json(draft);
        }

        let response = request.send().await.map_err(|error| {
            warn!(operation = operation.name(), %error, "user api unreachable");
            map_transport_error(&error)
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|error| {
            warn!(
                operation = operation.name(),
                status = status.as_u16(),
                %error,
                "user api response body unreadable"
            );
            map_body_error(status)
        })?;

        if status != operation.expected_status() {
            let error = map_status_error(operation, status, body.as_ref());
            warn!(
                operation = operation.name(),
                status = status.as_u16(),
                %error,
                "user api request failed"
            );
            return Err(error);
        }
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn list_users(&self) -> Result<Vec<User>, UserApiError> {
        let url = self.endpoint(&["users"]);
        let (status, body) = self.send(Operation::List, url, None).await?;
        decode(Operation::List, status, &body)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserApiError> {
        let url = self.endpoint(&["user", id.as_ref()]);
        let (status, body) = self.send(Operation::Get, url, None).await?;
        decode(Operation::Get, status, &body)
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<Option<User>, UserApiError> {
        let url = self.endpoint(&["create", "user"]);
        let (_, body) = self.send(Operation::Create, url, Some(draft)).await?;
        let saved = saved_record(&body);
        if saved.is_none() {
            debug!("create acknowledged without a record");
        }
        Ok(saved)
    }

    async fn update_user(&self, id: &UserId, draft: &UserDraft) -> Result<User, UserApiError> {
        let url = self.endpoint(&["update", "user", id.as_ref()]);
        let (_, body) = self.send(Operation::Update, url, Some(draft)).await?;
        // Some servers answer an update with a bare status message; the
        // record is then what was sent.
        Ok(saved_record(&body).unwrap_or_else(|| User::new(id.clone(), draft.clone())))
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserApiError> {
        let url = self.endpoint(&["delete", "user", id.as_ref()]);
        self.send(Operation::Delete, url, None).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(
    operation: Operation,
    status: StatusCode,
    body: &[u8],
) -> Result<T, UserApiError> {
    serde_json::from_slice(body).map_err(|error| {
        warn!(operation = operation.name(), %error, "undecodable user api response");
        UserApiError::server(status.as_u16(), None::<String>)
    })
}

fn saved_record(body: &[u8]) -> Option<User> {
    serde_json::from_slice::<SavedUserDto>(body)
        .ok()
        .map(SavedUserDto::into_user)
}

fn map_transport_error(error: &reqwest::Error) -> UserApiError {
    UserApiError::network(error.to_string())
}

fn map_body_error(status: StatusCode) -> UserApiError {
    UserApiError::server(status.as_u16(), None::<String>)
}

fn map_status_error(operation: Operation, status: StatusCode, body: &[u8]) -> UserApiError {
    let server_message = error_message(body);
    match status {
        StatusCode::NOT_FOUND if operation.addresses_one_user() => {
            UserApiError::not_found(server_message)
        }
        StatusCode::BAD_REQUEST if operation == Operation::Create => {
            UserApiError::conflict(server_message)
        }
        _ => UserApiError::server(status.as_u16(), server_message),
    }
}
