//! HTTP transport with deadline, cancellation and error classification

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
