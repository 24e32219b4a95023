//! Per-request options accepted by [`ApiClient::request`](super::ApiClient::request)

use authwire_domain::{ApiError, Result};
use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Method, headers, body and an optional cancellation signal
///
/// Caller headers are merged over the client's defaults, so a caller-supplied
/// `Content-Type` wins. When `signal` is set it replaces the client timeout.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method, GET by default
    pub method: Method,
    /// Headers merged over the client defaults
    pub headers: HeaderMap,
    /// Request body bytes
    pub body: Option<Vec<u8>>,
    /// Caller cancellation, replacing the client timeout
    pub signal: Option<CancellationToken>,
}

impl RequestOptions {
    /// Options for `method` with no headers, body or signal
    pub fn new(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    /// GET with no body
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// POST with no body yet
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// PUT with no body yet
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    /// PATCH with no body yet
    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    /// DELETE with no body
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Set a header, replacing any earlier value under the same name.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge `headers` in, replacing earlier values under the same names.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Raw request body, sent as-is.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON request body.
    ///
    /// # Errors
    /// Returns `ApiError::Generic` when `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| ApiError::generic(format!("Failed to serialize body: {e}")))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Cancel through `signal` instead of the client timeout.
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }
}
