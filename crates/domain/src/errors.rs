//! Error types used throughout the client
//!
//! [`ApiError`] is the canonical failure value surfaced to callers of the
//! authenticated client. Transport failures carry status `0`, an expired
//! session carries `401`, and server-reported failures carry the server's
//! status code and payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Status reported for failures that never produced an HTTP response.
pub const STATUS_NO_RESPONSE: u16 = 0;

/// Status reported for an unrecoverable session.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Categories of API errors for higher-level retry policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Connectivity and deadline failures - retryable
    Network,
    /// Session could not be renewed - requires a new login
    Authentication,
    /// Rate limiting (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx) - non-retryable
    Client,
    /// Unexpected local failures - non-retryable
    Internal,
    /// Configuration errors - non-retryable
    Config,
}

/// Classified failure returned by the authenticated client
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiError {
    /// The server could not be reached.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// The request deadline elapsed or the caller cancelled it.
    #[error("Request timed out: {message}")]
    Timeout { message: String },

    /// The access token could not be renewed; the user must log in again.
    #[error("Session expired: {message}")]
    SessionExpired { message: String },

    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        message: String,
        status: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },

    /// Any other local failure, carrying the original message.
    #[error("{message}")]
    Generic { message: String },

    /// The client was configured incorrectly.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ApiError {
    /// Build a `Connection` error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into() }
    }

    /// Build a `Timeout` error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout { message: message.into() }
    }

    /// Build a `SessionExpired` error
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::SessionExpired { message: message.into() }
    }

    /// Build an `Api` error from a response status and optional payload
    pub fn api(status: u16, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Api { message: message.into(), status, data }
    }

    /// Build a `Generic` error
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic { message: message.into() }
    }

    /// Build a `Config` error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Human readable message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection { message }
            | Self::Timeout { message }
            | Self::SessionExpired { message }
            | Self::Api { message, .. }
            | Self::Generic { message }
            | Self::Config { message } => message,
        }
    }

    /// Status code associated with the failure, if any.
    ///
    /// Transport failures report `0` so callers can distinguish "no response"
    /// from a server answer without matching on the variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } => Some(STATUS_NO_RESPONSE),
            Self::SessionExpired { .. } => Some(STATUS_UNAUTHORIZED),
            Self::Api { status, .. } => Some(*status),
            Self::Generic { .. } | Self::Config { .. } => None,
        }
    }

    /// Server-reported payload, if any.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Api { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// Whether the session is gone and a new login is needed
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } => ApiErrorCategory::Network,
            Self::SessionExpired { .. } => ApiErrorCategory::Authentication,
            Self::Api { status: 429, .. } => ApiErrorCategory::RateLimit,
            Self::Api { status, .. } if *status >= 500 => ApiErrorCategory::Server,
            Self::Api { .. } => ApiErrorCategory::Client,
            Self::Generic { .. } => ApiErrorCategory::Internal,
            Self::Config { .. } => ApiErrorCategory::Config,
        }
    }

    /// Check if this error may succeed when retried later
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::Network | ApiErrorCategory::RateLimit | ApiErrorCategory::Server
        )
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::generic(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
