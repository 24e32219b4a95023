//! Token storage and refresh coordination shared by authwire crates.
//!
//! # Feature Tiers
//!
//! - default: token store, storage media, refresh coordinator
//! - `platform`: platform keychain storage via `keyring`
//! - `test-utils`: mock collaborators for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use auth::{
    KeyValueStorage, LoginNavigator, RefreshCoordinator, RefreshTokenClient, StorageError,
    TokenStore,
};
