//! Token storage and refresh coordination
//!
//! This module holds the stateful half of the authenticated client: where
//! tokens live and how concurrent refreshes are collapsed into one.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │  RefreshCoordinator │  Single-flight refresh (leader + FIFO waiters)
//! └─────────┬──────────┘
//!           │ leader runs the refresh through
//!           ▼
//! ┌────────────────────┐      ┌──────────────────────┐
//! │     TokenStore      │ ───► │   KeyValueStorage     │  Memory / Noop /
//! └────────────────────┘      └──────────────────────┘  Keychain
//! ```
//!
//! # Module Organization
//!
//! - **[`traits`]**: collaborator seams (`KeyValueStorage`,
//!   `RefreshTokenClient`, `LoginNavigator`)
//! - **[`storage`]**: in-memory and detached storage media
//! - **[`token_store`]**: access/refresh token accessors
//! - **[`coordinator`]**: single-flight refresh coordination
//! - **[`navigation`]**: headless navigator
//! - `keychain`: platform keychain storage (feature `platform`)

pub mod coordinator;
#[cfg(feature = "platform")]
mod keychain;
pub mod navigation;
pub mod storage;
pub mod token_store;
pub mod traits;

pub use coordinator::{RefreshCoordinator, RefreshLease, RefreshOutcome, RefreshTicket, RefreshWaiter};
#[cfg(feature = "platform")]
pub use keychain::KeychainStorage;
pub use navigation::NoopNavigator;
pub use storage::{MemoryStorage, NoopStorage, StorageError};
pub use token_store::TokenStore;
pub use traits::{KeyValueStorage, LoginNavigator, RefreshTokenClient};
