//! Client-side validation rules for user drafts.
//!
//! Rules are independent and order-insensitive. `validate` is pure, so
//! controllers call it on every submit attempt and replace the whole error
//! map with the result.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use super::user::{Field, UserDraft};

/// Message shown when the name is blank.
pub const NAME_REQUIRED: &str = "Name is required";
/// Message shown when the email is blank.
pub const EMAIL_REQUIRED: &str = "Email is required";
/// Message shown when the email does not look like `local@domain.tld`.
pub const EMAIL_INVALID: &str = "Email is invalid";
/// Message shown when the address is blank.
pub const ADDRESS_REQUIRED: &str = "Address is required";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^\S+@\S+\.\S+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// Build an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Message attached to `field`, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Attach `message` to `field`, replacing any previous message.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drop the message for `field`. Returns whether one was present.
    pub fn clear(&mut self, field: Field) -> bool {
        self.0.remove(&field).is_some()
    }

    /// Whether no field carries an error.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields carrying an error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate errors in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Whether `email` matches the `local@domain.tld` shape.
///
/// # Examples
/// ```
/// use client::domain::validation::is_valid_email;
///
/// assert!(is_valid_email("a@b.c"));
/// assert!(!is_valid_email("abc"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Check a draft against every rule.
///
/// The result is empty iff the draft may be submitted.
pub fn validate(draft: &UserDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.name.trim().is_empty() {
        errors.insert(Field::Name, NAME_REQUIRED);
    }

    if draft.email.trim().is_empty() {
        errors.insert(Field::Email, EMAIL_REQUIRED);
    } else if !is_valid_email(&draft.email) {
        errors.insert(Field::Email, EMAIL_INVALID);
    }

    if draft.address.trim().is_empty() {
        errors.insert(Field::Address, ADDRESS_REQUIRED);
    }

    errors
}
