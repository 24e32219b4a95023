//! Client constants
//!
//! Centralized location for the storage keys, endpoint paths and defaults
//! shared by the token store and the request executor.

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Default token refresh endpoint
pub const REFRESH_ENDPOINT: &str = "/auth/refresh";
/// Password login endpoint
pub const LOGIN_ENDPOINT: &str = "/auth/login";
/// Account registration endpoint
pub const REGISTER_ENDPOINT: &str = "/auth/register";

/// Endpoints that must never carry a (possibly stale) bearer token.
pub const CREDENTIAL_ENDPOINTS: [&str; 2] = [LOGIN_ENDPOINT, REGISTER_ENDPOINT];

/// Client-side route of the login surface
pub const LOGIN_PATH: &str = "/login";

/// Per-request deadline when the caller passes no signal
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default `Content-Type` of every request
pub const JSON_CONTENT_TYPE: &str = "application/json";
