//! Traits for the collaborators of the authenticated client
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (storage medium, refresh endpoint, navigation).

use async_trait::async_trait;
use authwire_domain::ApiError;

use super::storage::StorageError;

/// Trait for the storage medium backing the token store
///
/// Implementations persist plain string values under string keys. The token
/// store treats every error as "value absent", so implementations should
/// report failures rather than panic.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// # Returns
    /// `Ok(None)` when nothing is stored
    ///
    /// # Errors
    /// Returns error if the medium cannot be read
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`
    ///
    /// # Errors
    /// Returns error if the medium rejects the write
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key` (idempotent)
    ///
    /// # Errors
    /// Returns error if the medium rejects the removal
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Trait for exchanging a refresh token for a new access token
///
/// The default implementation talks to `POST /auth/refresh`; tests swap in
/// a mock to count calls and script outcomes.
#[async_trait]
pub trait RefreshTokenClient: Send + Sync {
    /// Exchange `refresh_token` for a new access token
    ///
    /// # Errors
    /// Returns error on network failure, non-success status or a malformed
    /// response body
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ApiError>;
}

/// Trait for the navigation primitive used on session expiry
pub trait LoginNavigator: Send + Sync {
    /// Path currently displayed, if the environment has one
    fn current_path(&self) -> Option<String>;

    /// Navigate the environment to `path`
    fn navigate_to(&self, path: &str);
}
