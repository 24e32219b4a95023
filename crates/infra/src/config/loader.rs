//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment when one exists
//! 2. Attempts to load from environment variables
//! 3. If the base URL is absent, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON or TOML)
//!
//! ## Environment Variables
//! - `AUTHWIRE_API_BASE_URL`: API base URL (required)
//! - `AUTHWIRE_REQUEST_TIMEOUT_SECS`: Per-request deadline in seconds
//! - `AUTHWIRE_REFRESH_ENDPOINT`: Path of the token refresh endpoint
//! - `AUTHWIRE_LOGIN_PATH`: Navigation target when the session expires
//! - `AUTHWIRE_USER_AGENT`: User-Agent header sent with every request
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./authwire.json` or `./authwire.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use authwire_domain::{ApiError, ClientConfig, ClientConfigFile, Result};
use tracing::{debug, info};

use crate::api::endpoint::validate_base_url;

/// Base URL of the API (required)
pub const ENV_BASE_URL: &str = "AUTHWIRE_API_BASE_URL";
/// Request timeout in whole seconds
pub const ENV_TIMEOUT_SECS: &str = "AUTHWIRE_REQUEST_TIMEOUT_SECS";
/// Path of the token refresh endpoint
pub const ENV_REFRESH_ENDPOINT: &str = "AUTHWIRE_REFRESH_ENDPOINT";
/// Route to navigate to when the session expires
pub const ENV_LOGIN_PATH: &str = "AUTHWIRE_LOGIN_PATH";
/// `User-Agent` header value
pub const ENV_USER_AGENT: &str = "AUTHWIRE_USER_AGENT";

/// Load configuration with automatic fallback strategy
///
/// Reads `.env` first, then environment variables. If the base URL is not
/// set there, falls back to a config file.
///
/// # Errors
/// Returns `ApiError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The base URL is missing or is not an http(s) URL
pub fn load() -> Result<ClientConfig> {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => debug!(error = %e, "No .env file loaded"),
    }

    match load_from_env() {
        Ok(config) => {
            info!(base_url = %config.base_url, "Configuration loaded from environment variables");
            Ok(config)
        }
        Err(env_err) => {
            debug!(error = ?env_err, "Failed to load from environment, trying file");
            load_from_file(None).map_err(|file_err| {
                ApiError::config(format!(
                    "{} (environment: {})",
                    file_err.message(),
                    env_err.message()
                ))
            })
        }
    }
}

/// Load configuration from the process environment
///
/// # Errors
/// Returns `ApiError::Config` if `AUTHWIRE_API_BASE_URL` is missing or any
/// variable has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup
///
/// Lets callers source variables from somewhere other than the process
/// environment (and keeps tests free of global state).
pub fn load_from_lookup<F>(lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = lookup(ENV_BASE_URL)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            ApiError::config(format!("Missing required environment variable: {ENV_BASE_URL}"))
        })?;

    let timeout_secs = lookup(ENV_TIMEOUT_SECS)
        .map(|raw| {
            raw.trim().parse::<u64>().map_err(|e| {
                ApiError::config(format!("Invalid {ENV_TIMEOUT_SECS} value '{raw}': {e}"))
            })
        })
        .transpose()?;

    finish(ClientConfigFile {
        base_url: Some(base_url),
        timeout_secs,
        refresh_endpoint: lookup(ENV_REFRESH_ENDPOINT),
        login_path: lookup(ENV_LOGIN_PATH),
        user_agent: lookup(ENV_USER_AGENT),
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ApiError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The base URL is missing or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ApiError::config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ApiError::config("No config file found in any of the standard locations")
        })?,
    };

    info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ApiError::config(format!("Failed to read config file: {e}")))?;

    finish(parse_config(&contents, &config_path)?)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfigFile> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => {
            toml::from_str(contents).map_err(|e| ApiError::config(format!("Invalid TOML format: {e}")))
        }
        "json" => serde_json::from_str(contents)
            .map_err(|e| ApiError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(ApiError::config(format!("Unsupported config format: {extension}"))),
    }
}

fn finish(file: ClientConfigFile) -> Result<ClientConfig> {
    let config = ClientConfig::try_from(file)?;
    validate_base_url(&config.base_url)?;
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("authwire.json"),
        dir.join("authwire.toml"),
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    fn write_temp(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file.write_all(contents.as_bytes()).expect("Failed to write temp file");

        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
        path
    }

    #[test]
    fn test_lookup_with_all_vars() {
        let config = load_from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://api.example.com/"),
            (ENV_TIMEOUT_SECS, "12"),
            (ENV_REFRESH_ENDPOINT, "/v2/auth/refresh"),
            (ENV_LOGIN_PATH, "/signin"),
            (ENV_USER_AGENT, "authwire-test/1.0"),
        ]))
        .expect("config should load");

        assert_eq!(config.base_url, "https://api.example.com/");
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.refresh_endpoint, "/v2/auth/refresh");
        assert_eq!(config.login_path, "/signin");
        assert_eq!(config.user_agent.as_deref(), Some("authwire-test/1.0"));
    }

    #[test]
    fn test_lookup_defaults() {
        let config = load_from_lookup(lookup_from(&[(ENV_BASE_URL, "http://localhost:3000")]))
            .expect("config should load");

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_endpoint, "/auth/refresh");
        assert_eq!(config.login_path, "/login");
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_lookup_missing_base_url() {
        let err = load_from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "5")])).unwrap_err();
        assert!(matches!(err, ApiError::Config { .. }));
        assert!(err.message().contains(ENV_BASE_URL));

        let blank = load_from_lookup(lookup_from(&[(ENV_BASE_URL, "  ")])).unwrap_err();
        assert!(matches!(blank, ApiError::Config { .. }));
    }

    #[test]
    fn test_lookup_rejects_invalid_values() {
        let bad_timeout = load_from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://api.example.com"),
            (ENV_TIMEOUT_SECS, "soon"),
        ]));
        assert!(matches!(bad_timeout, Err(ApiError::Config { .. })));

        let zero_timeout = load_from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://api.example.com"),
            (ENV_TIMEOUT_SECS, "0"),
        ]));
        assert!(matches!(zero_timeout, Err(ApiError::Config { .. })));

        let bad_scheme = load_from_lookup(lookup_from(&[(ENV_BASE_URL, "ftp://files.example.com")]));
        assert!(matches!(bad_scheme, Err(ApiError::Config { .. })));
    }

    #[test]
    fn test_load_from_env_reads_process_environment() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        let saved = std::env::var(ENV_BASE_URL).ok();

        std::env::set_var(ENV_BASE_URL, "https://env.example.com");
        let result = load_from_env();

        match saved {
            Some(val) => std::env::set_var(ENV_BASE_URL, val),
            None => std::env::remove_var(ENV_BASE_URL),
        }

        let config = result.expect("config should load from env");
        assert_eq!(config.base_url, "https://env.example.com");
    }

    #[test]
    fn test_load_from_file_json() {
        let path = write_temp(
            r#"{ "base_url": "https://json.example.com", "timeout_secs": 5, "login_path": "/auth" }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("json config");
        assert_eq!(config.base_url, "https://json.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.login_path, "/auth");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = write_temp(
            "base_url = \"https://toml.example.com\"\nrefresh_endpoint = \"/token/renew\"\n",
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("toml config");
        assert_eq!(config.base_url, "https://toml.example.com");
        assert_eq!(config.refresh_endpoint, "/token/renew");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_without_base_url() {
        let path = write_temp(r#"{ "timeout_secs": 5 }"#, "json");

        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(ApiError::Config { .. })));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/authwire.json")));
        assert!(matches!(result, Err(ApiError::Config { .. })));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("base_url: x", Path::new("authwire.yaml"));
        let err = result.unwrap_err();
        assert!(err.message().contains("Unsupported config format"));
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let result = parse_config("{ not json", Path::new("authwire.json"));
        assert!(matches!(result, Err(ApiError::Config { .. })));
    }
}
