//! Client configuration.
//!
//! Loaded from environment variables (names in [`campus_core::defaults`]);
//! the CLI reads a `.env` file first so the same variables work there.

use std::time::Duration;

use campus_core::defaults;
use campus_core::{Error, Result};
use tracing::debug;

/// Settings for talking to the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, e.g. `https://api.example.com/api`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Session cookie value sent as `token=<value>`, if any.
    pub session_cookie: Option<String>,
    /// Route of the login page for redirects on an invalid session.
    pub login_route: String,
    /// Third-party contact number shown on the public site.
    pub contact_number: Option<String>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            timeout_secs: defaults::API_TIMEOUT_SECS,
            session_cookie: None,
            login_route: defaults::LOGIN_ROUTE.to_string(),
            contact_number: None,
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Create from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let config = Self {
            base_url: non_empty(defaults::ENV_API_BASE_URL)
                .unwrap_or_else(|| defaults::API_BASE_URL.to_string()),
            timeout_secs: non_empty(defaults::ENV_API_TIMEOUT_SECS)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::API_TIMEOUT_SECS),
            session_cookie: non_empty(defaults::ENV_SESSION_COOKIE),
            login_route: non_empty(defaults::ENV_LOGIN_ROUTE)
                .unwrap_or_else(|| defaults::LOGIN_ROUTE.to_string()),
            contact_number: non_empty(defaults::ENV_CONTACT_NUMBER),
            user_agent: defaults::USER_AGENT.to_string(),
        };
        debug!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "Client config loaded");
        config
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_contact_number(mut self, number: impl Into<String>) -> Self {
        self.contact_number = Some(number.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings before building a client.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "{} must be an http(s) URL, got '{}'",
                defaults::ENV_API_BASE_URL,
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(format!(
                "{} must be greater than zero",
                defaults::ENV_API_TIMEOUT_SECS
            )));
        }
        if !self.login_route.starts_with('/') {
            return Err(Error::Config(format!(
                "{} must be an absolute route, got '{}'",
                defaults::ENV_LOGIN_ROUTE,
                self.login_route
            )));
        }
        Ok(())
    }

    /// Join a relative API path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
