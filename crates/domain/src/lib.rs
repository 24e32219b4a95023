//! # Authwire Domain
//!
//! Domain types shared by the authwire crates.
//!
//! This crate contains:
//! - The classified error taxonomy ([`ApiError`]) and Result definition
//! - Client configuration structures
//! - Token and refresh endpoint data types
//! - Storage keys, endpoint paths and defaults
//!
//! ## Architecture
//! - No dependencies on other authwire crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
