//! Platform keychain storage for tokens
//!
//! Persists tokens via the `keyring` crate: macOS Keychain Access, Windows
//! Credential Manager and the Linux Secret Service API. Entries are namespaced
//! by a service name and keyed as `<account>.<key>`.

use keyring::Entry;
use tracing::debug;

use super::storage::StorageError;
use super::traits::KeyValueStorage;

/// Keychain-backed key/value storage
#[derive(Debug, Clone)]
pub struct KeychainStorage {
    service_name: String,
    account: String,
}

impl KeychainStorage {
    /// Create a keychain storage for a service and account
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "Authwire.api")
    /// * `account` - Account namespace (e.g., "main" or a user id)
    pub fn new(service_name: impl Into<String>, account: impl Into<String>) -> Self {
        Self { service_name: service_name.into(), account: account.into() }
    }

    /// Service identifier entries are stored under
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn create_entry(&self, key: &str) -> Result<Entry, StorageError> {
        let user = format!("{}.{}", self.account, key);
        Entry::new(&self.service_name, &user).map_err(|e| {
            StorageError::Unavailable(format!("Failed to open keychain entry for {key}: {e}"))
        })
    }
}

impl KeyValueStorage for KeychainStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        debug!(service = %self.service_name, key = %key, "Reading token from keychain");

        let entry = self.create_entry(key)?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => {
                Err(StorageError::Backend(format!("Failed to retrieve secret for {key}: {e}")))
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(service = %self.service_name, key = %key, "Storing token in keychain");

        let entry = self.create_entry(key)?;
        entry
            .set_password(value)
            .map_err(|e| StorageError::Backend(format!("Failed to store secret for {key}: {e}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        debug!(service = %self.service_name, key = %key, "Deleting token from keychain");

        let entry = self.create_entry(key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                Err(StorageError::Backend(format!("Failed to delete secret for {key}: {e}")))
            }
        }
    }
}
