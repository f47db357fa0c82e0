//! Wire shapes for directory API responses that are not plain records.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::User;

/// Body returned by create and update calls.
///
/// Servers either echo the saved record or wrap it under `user` or `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SavedUserDto {
    Record(User),
    Wrapped {
        #[serde(alias = "data")]
        user: User,
    },
}

impl SavedUserDto {
    pub(super) fn into_user(self) -> User {
        match self {
            Self::Record(user) | Self::Wrapped { user } => user,
        }
    }
}

/// Extract the human readable message from an error body.
///
/// Looks at `message` first, then `errorMessage`; blank values are ignored.
pub(super) fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "errorMessage"]
        .into_iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_owned)
}
