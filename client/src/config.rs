//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `USER_DIRECTORY_*` environment variables and the
//! optional configuration file; command-line flags of the binary override
//! them afterwards.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::controllers::{DEFAULT_SUCCESS_DISPLAY, FormControllerConfig};
use crate::outbound::notifications::DEFAULT_NOTIFICATION_TTL;

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The configured API base URL does not parse.
    #[error("invalid api base url {value:?}: {source}")]
    InvalidBaseUrl {
        /// Value as configured.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
}

/// Configuration values for the user directory client.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_DIRECTORY")]
pub struct ClientSettings {
    /// Base URL of the REST API, including any path prefix.
    pub api_base_url: Option<String>,
    /// Whole-request timeout in milliseconds. Unset uses transport defaults.
    pub request_timeout_ms: Option<u64>,
    /// How long success banners stay up before a form leaves.
    pub success_display_ms: Option<u64>,
    /// How long notifications stay visible.
    pub notification_ttl_ms: Option<u64>,
}

impl ClientSettings {
    /// Parsed API base URL, falling back to [`DEFAULT_API_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the configured value is
    /// not an absolute URL.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let value = self
            .api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(value).map_err(|source| SettingsError::InvalidBaseUrl {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Success banner display time.
    pub fn success_display(&self) -> Duration {
        self.success_display_ms
            .map_or(DEFAULT_SUCCESS_DISPLAY, Duration::from_millis)
    }

    /// Notification time to live.
    pub fn notification_ttl(&self) -> Duration {
        self.notification_ttl_ms
            .map_or(DEFAULT_NOTIFICATION_TTL, Duration::from_millis)
    }

    /// Timing configuration handed to form controllers.
    pub fn form_config(&self) -> FormControllerConfig {
        FormControllerConfig {
            success_display: self.success_display(),
        }
    }
}
