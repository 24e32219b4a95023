use std::time::Duration;

use authwire_domain::constants::DEFAULT_TIMEOUT_SECS;
use authwire_domain::ApiError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::IntoApiError;

/// HTTP client with a per-dispatch deadline and caller cancellation.
///
/// Every transport failure leaves this type already classified as an
/// [`ApiError`]; callers never see a raw `reqwest::Error`.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ApiError> {
        Self::builder().build()
    }

    /// Deadline applied when the caller supplies no signal.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder.
    ///
    /// With a `signal` the request runs until it completes or the signal
    /// fires; without one the configured timeout applies. Both cancellation
    /// paths fail with `ApiError::Timeout`.
    pub async fn send(
        &self,
        builder: RequestBuilder,
        signal: Option<&CancellationToken>,
    ) -> Result<Response, ApiError> {
        let request = builder.build().map_err(IntoApiError::into_api_error)?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let execution = self.client.execute(request);
        let result = match signal {
            Some(signal) => tokio::select! {
                biased;
                () = signal.cancelled() => {
                    debug!(%method, %url, "HTTP request cancelled by caller");
                    return Err(ApiError::timeout("request was cancelled"));
                }
                result = execution => result,
            },
            None => match tokio::time::timeout(self.timeout, execution).await {
                Ok(result) => result,
                Err(_) => {
                    debug!(%method, %url, timeout = ?self.timeout, "HTTP request timed out");
                    return Err(ApiError::timeout(format!(
                        "no response within {} ms",
                        self.timeout.as_millis()
                    )));
                }
            },
        };

        match result {
            Ok(response) => {
                let status = response.status();
                debug!(%method, %url, %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(err.into_api_error())
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-dispatch deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `User-Agent` header for every request
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers sent with every request
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HttpClient, ApiError> {
        // The deadline is enforced per dispatch in `send`, not by reqwest, so
        // a caller-supplied signal can replace it.
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| ApiError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}
