//! # Authwire Infrastructure
//!
//! HTTP-facing half of the authenticated client.
//!
//! This crate contains:
//! - The request executor ([`ApiClient`]) with 401 recovery
//! - The HTTP refresh-token exchange
//! - Transport with deadline, cancellation and error classification
//! - Configuration loading (environment, `.env`, JSON/TOML files)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements the collaborator traits defined in `authwire-common`
//! - Depends on `authwire-domain` for the error taxonomy and config types
//! - Contains all "impure" code (network, files, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder, HttpRefreshClient, RequestOptions};
pub use errors::IntoApiError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, LogFormat};
