//! Runtime configuration loaded via OrthoConfig.
//!
//! Values layer command-line flags over `EXTRAS_CONSOLE_*` environment
//! variables and an optional configuration file.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The configured base URL does not parse.
    #[error("invalid backend base URL {value:?}: {source}")]
    InvalidBaseUrl {
        /// Raw configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// A zero timeout would fail every request immediately.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Settings for connecting the console to the administration backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EXTRAS_CONSOLE")]
pub struct ConsoleSettings {
    /// Backend origin, optionally with a path prefix.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Bearer token attached to every request.
    pub auth_token: Option<String>,
}

impl ConsoleSettings {
    /// Return the configured backend URL, falling back to the local default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the value does not
    /// parse as an absolute URL.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse(raw).map_err(|source| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            source,
        })
    }

    /// Return the request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTimeout`] when configured as zero.
    pub const fn request_timeout(&self) -> Result<Duration, SettingsError> {
        if self.request_timeout_secs == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        Ok(Duration::from_secs(self.request_timeout_secs))
    }

    /// Return the bearer token, ignoring blank values.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for console configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ConsoleSettings {
        ConsoleSettings::load_from_iter([OsString::from("extras-console")])
            .expect("config should load")
    }

    fn cleared_env() -> [(&'static str, Option<String>); 3] {
        [
            ("EXTRAS_CONSOLE_BASE_URL", None),
            ("EXTRAS_CONSOLE_REQUEST_TIMEOUT_SECS", None),
            ("EXTRAS_CONSOLE_AUTH_TOKEN", None),
        ]
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared_env());

        let settings = load_from_empty_args();

        assert_eq!(
            settings.base_url().expect("default parses").as_str(),
            "http://localhost:8000/"
        );
        assert_eq!(
            settings.request_timeout().expect("default timeout"),
            Duration::from_secs(30)
        );
        assert!(settings.auth_token().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "EXTRAS_CONSOLE_BASE_URL",
                Some("https://admin.example.test/panel".to_owned()),
            ),
            ("EXTRAS_CONSOLE_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
            ("EXTRAS_CONSOLE_AUTH_TOKEN", Some("secret".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.base_url().expect("override parses").path(),
            "/panel"
        );
        assert_eq!(
            settings.request_timeout().expect("override timeout"),
            Duration::from_secs(5)
        );
        assert_eq!(settings.auth_token(), Some("secret"));
    }

    #[rstest]
    #[case::relative("admin/panel")]
    #[case::empty("")]
    fn unparseable_base_url_is_rejected(#[case] raw: &str) {
        let settings = ConsoleSettings {
            base_url: Some(raw.to_owned()),
            request_timeout_secs: 30,
            auth_token: None,
        };

        assert!(matches!(
            settings.base_url(),
            Err(SettingsError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let settings = ConsoleSettings {
            base_url: None,
            request_timeout_secs: 0,
            auth_token: Some("   ".to_owned()),
        };

        assert!(matches!(
            settings.request_timeout(),
            Err(SettingsError::ZeroTimeout)
        ));
        assert!(settings.auth_token().is_none());
    }
}
