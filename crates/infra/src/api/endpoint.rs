//! URL composition and endpoint classification

use authwire_domain::constants::CREDENTIAL_ENDPOINTS;
use authwire_domain::{ApiError, Result};
use url::Url;

/// Join `endpoint` onto `base_url` with exactly one `/` between them.
///
/// One trailing slash is dropped from the base and every leading slash is
/// dropped from the endpoint before joining.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{base}{}", normalize_path(endpoint))
}

/// Endpoint path with exactly one leading `/`, as it appears after the base.
pub fn normalize_path(endpoint: &str) -> String {
    format!("/{}", endpoint.trim_start_matches('/'))
}

/// Login and registration calls never carry a bearer token.
pub fn is_credential_endpoint(endpoint: &str) -> bool {
    let path = normalize_path(endpoint);
    CREDENTIAL_ENDPOINTS.iter().any(|candidate| path.contains(candidate))
}

/// Endpoints whose 401 means "bad credentials", not "expired session".
///
/// A 401 from any of these is handed back to the caller without a refresh.
pub fn is_auth_endpoint(endpoint: &str, refresh_endpoint: &str) -> bool {
    if is_credential_endpoint(endpoint) {
        return true;
    }
    if refresh_endpoint.trim_start_matches('/').is_empty() {
        return false;
    }
    normalize_path(endpoint).contains(&normalize_path(refresh_endpoint))
}

/// Reject base URLs that are not absolute http(s) URLs.
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed = Url::parse(base_url)
        .map_err(|e| ApiError::config(format!("Invalid API base URL '{base_url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ApiError::config(format!(
            "API base URL must use http or https, got '{other}'"
        ))),
    }
}
