//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TIMEOUT_SECS, LOGIN_PATH, REFRESH_ENDPOINT};
use crate::errors::{ApiError, Result};

/// Configuration for the authenticated client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL for the API (e.g., "https://api.example.com")
    pub base_url: String,
    /// Deadline applied to each dispatch unless the caller passes a signal
    pub timeout: Duration,
    /// Path of the token refresh endpoint, relative to `base_url`
    pub refresh_endpoint: String,
    /// Navigation target used when the session cannot be renewed
    pub login_path: String,
    /// `User-Agent` sent with every request, if set
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create a configuration with default timeout and endpoints.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if `base_url` is blank; the client refuses
    /// to operate without one.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ApiError::config("API base URL is not configured"));
        }

        Ok(Self {
            base_url: base_url.trim().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh_endpoint: REFRESH_ENDPOINT.to_string(),
            login_path: LOGIN_PATH.to_string(),
            user_agent: None,
        })
    }

    /// Override the per-request deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the refresh endpoint path
    pub fn with_refresh_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.refresh_endpoint = endpoint.into();
        self
    }

    /// Override the login route
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Send a `User-Agent` header
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}

/// On-disk representation of [`ClientConfig`] (JSON or TOML)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfigFile {
    /// See [`ClientConfig::base_url`]
    #[serde(default)]
    pub base_url: Option<String>,
    /// Timeout in whole seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// See [`ClientConfig::refresh_endpoint`]
    #[serde(default)]
    pub refresh_endpoint: Option<String>,
    /// See [`ClientConfig::login_path`]
    #[serde(default)]
    pub login_path: Option<String>,
    /// See [`ClientConfig::user_agent`]
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl TryFrom<ClientConfigFile> for ClientConfig {
    type Error = ApiError;

    fn try_from(file: ClientConfigFile) -> Result<Self> {
        let mut config = Self::new(file.base_url.unwrap_or_default())?;

        if let Some(secs) = file.timeout_secs {
            if secs == 0 {
                return Err(ApiError::config("timeout_secs must be greater than zero"));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(endpoint) = file.refresh_endpoint {
            config.refresh_endpoint = endpoint;
        }
        if let Some(path) = file.login_path {
            config.login_path = path;
        }
        config.user_agent = file.user_agent;

        Ok(config)
    }
}
