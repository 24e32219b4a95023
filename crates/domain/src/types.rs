//! Token and refresh endpoint data types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access/refresh token pair as persisted by the token store
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    /// Short-lived bearer token
    pub access_token: String,
    /// Long-lived token exchanged for a new access token
    pub refresh_token: String,
}

impl Tokens {
    /// Pair the two tokens
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

// Tokens end up in tracing spans; never print the secrets themselves.
impl fmt::Debug for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Body sent to the refresh endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Token being exchanged
    pub refresh_token: String,
}

/// Envelope returned by the refresh endpoint
///
/// Only `{ "success": true, "data": { "accessToken": "..." } }` counts as a
/// successful refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    /// Server verdict; anything but `true` is a failed refresh
    #[serde(default)]
    pub success: bool,
    /// Payload carrying the new access token
    #[serde(default)]
    pub data: Option<RefreshData>,
}

/// `data` member of [`RefreshResponse`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    /// Newly issued access token
    pub access_token: String,
}

impl RefreshResponse {
    /// Extract the new access token if the envelope reports success.
    pub fn into_access_token(self) -> Option<String> {
        if !self.success {
            return None;
        }
        self.data.map(|data| data.access_token).filter(|token| !token.is_empty())
    }
}
