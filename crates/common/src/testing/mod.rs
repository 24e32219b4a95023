//! Testing utilities and helpers
//!
//! - **[`mocks`]**: Mock implementations of the collaborator traits
//!
//! Enabled for downstream crates through the `test-utils` feature.

pub mod mocks;

pub use mocks::{MockRefreshClient, RecordingNavigator};
