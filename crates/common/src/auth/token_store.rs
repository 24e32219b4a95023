//! Token store
//!
//! Single source of truth for the access and refresh tokens. Every read goes
//! through the backing [`KeyValueStorage`] so the "current" token is always
//! authoritative; nothing is cached here.
//!
//! Storage failures never surface to callers: they are logged and treated as
//! "token absent".

use std::sync::Arc;

use authwire_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use authwire_domain::Tokens;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::storage::{MemoryStorage, NoopStorage};
use super::traits::KeyValueStorage;

/// Access/refresh token accessors over an injected storage medium
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
    // Serializes pair writes against pair reads; single reads share it too so
    // a reader never sees half of a save.
    lock: RwLock<()>,
}

impl TokenStore {
    /// Store over an injected storage medium
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage, lock: RwLock::new(()) }
    }

    /// Store backed by a fresh [`MemoryStorage`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Store for contexts without persistent storage; always empty
    pub fn detached() -> Self {
        Self::new(Arc::new(NoopStorage))
    }

    /// Current access token, if stored
    pub fn access_token(&self) -> Option<String> {
        let _guard = self.lock.read();
        self.read(ACCESS_TOKEN_KEY)
    }

    /// Current refresh token, if stored
    pub fn refresh_token(&self) -> Option<String> {
        let _guard = self.lock.read();
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Both tokens, read under one lock
    ///
    /// # Returns
    /// `None` unless both tokens are present
    pub fn tokens(&self) -> Option<Tokens> {
        let _guard = self.lock.read();
        let access_token = self.read(ACCESS_TOKEN_KEY)?;
        let refresh_token = self.read(REFRESH_TOKEN_KEY)?;
        Some(Tokens { access_token, refresh_token })
    }

    /// Overwrite both tokens
    ///
    /// If the refresh token cannot be written both keys are removed, leaving
    /// the store empty rather than pairing the new access token (or an old
    /// one) with a stale refresh token.
    pub fn save_tokens(&self, access_token: &str, refresh_token: &str) {
        let _guard = self.lock.write();

        if let Err(e) = self.storage.set(ACCESS_TOKEN_KEY, access_token) {
            warn!(error = %e, "Failed to persist access token");
            return;
        }

        if let Err(e) = self.storage.set(REFRESH_TOKEN_KEY, refresh_token) {
            warn!(error = %e, "Failed to persist refresh token; clearing stored tokens");
            for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
                if let Err(e) = self.storage.remove(key) {
                    warn!(key, error = %e, "Failed to roll back token");
                }
            }
            return;
        }

        debug!("Tokens saved");
    }

    /// Remove both tokens (idempotent)
    pub fn clear_tokens(&self) {
        let _guard = self.lock.write();

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove token");
            }
        }

        debug!("Tokens cleared");
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Token storage read failed; treating token as absent");
                None
            }
        }
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
