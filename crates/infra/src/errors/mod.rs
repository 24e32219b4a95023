//! Error classification at the transport boundary

pub mod conversions;

pub use conversions::IntoApiError;
