//! User data model.
//!
//! `User` mirrors a persisted record as returned by the directory API.
//! `UserDraft` is the editable, unsaved copy a form works on.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// The identifier is empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier carries leading or trailing whitespace.
    #[error("user id must not contain surrounding whitespace")]
    PaddedId,
}

/// Server-assigned user identifier.
///
/// The value is opaque: the client never parses it, only echoes it back in
/// request paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use client::domain::UserId;
    ///
    /// let id = UserId::new("42").expect("valid id");
    /// assert_eq!(id.as_ref(), "42");
    /// assert!(UserId::new(" 42").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.into())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::PaddedId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Editable user field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// Display name.
    Name,
    /// Contact email.
    Email,
    /// Postal address.
    Address,
}

impl Field {
    /// Every editable field in form order.
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Address];

    /// Wire and form name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
        }
    }

    /// Human readable label used in prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Address => "Address",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-progress, unsaved copy of the editable user fields.
///
/// The draft is also the request body for create and update calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Postal address.
    pub address: String,
}

impl UserDraft {
    /// Build a draft from the three field values.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: address.into(),
        }
    }

    /// Current value of `field`.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => self.name.as_str(),
            Field::Email => self.email.as_str(),
            Field::Address => self.address.as_str(),
        }
    }

    /// Replace the value of `field`.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Address => self.address = value,
        }
    }
}

/// Persisted user record.
///
/// ## Invariants
/// - `id` is assigned by the server and never changes afterwards.
///
/// Serialises as `{ "_id", "name", "email", "address" }`. Unknown fields
/// sent by the server (timestamps, version keys) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    address: String,
}

impl User {
    /// Attach a server-assigned identifier to a set of field values.
    pub fn new(id: UserId, fields: UserDraft) -> Self {
        let UserDraft {
            name,
            email,
            address,
        } = fields;
        Self {
            id,
            name,
            email,
            address,
        }
    }

    /// Stable server-assigned identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Postal address.
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Copy the editable fields into a fresh draft.
    pub fn to_draft(&self) -> UserDraft {
        UserDraft::new(
            self.name.clone(),
            self.email.clone(),
            self.address.clone(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDto {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    address: String,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            name,
            email,
            address,
        } = value;
        Self {
            id: id.into(),
            name,
            email,
            address,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let id = UserId::new(value.id)?;
        Ok(Self::new(
            id,
            UserDraft::new(value.name, value.email, value.address),
        ))
    }
}

#[cfg(test)]
mod tests;
