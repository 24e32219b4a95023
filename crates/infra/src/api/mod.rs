//! Authenticated API client
//!
//! # Architecture
//!
//! - `client`: request executor with 401 recovery and login redirect
//! - `refresh`: HTTP exchange of the refresh token
//! - `endpoint`: URL joining and auth endpoint classification
//! - `options` / `response`: request inputs and JSON response handling
//!
//! Uses [`HttpClient`](crate::http::HttpClient) for transport; no direct
//! reqwest calls outside of it.

pub mod client;
pub mod endpoint;
pub mod options;
pub mod refresh;
pub mod response;

pub use client::{ApiClient, ApiClientBuilder};
pub use options::RequestOptions;
pub use refresh::HttpRefreshClient;
