//! Refresh-token exchange over HTTP

use async_trait::async_trait;
use authwire_common::RefreshTokenClient;
use authwire_domain::{ApiError, ClientConfig, RefreshRequest, RefreshResponse};
use reqwest::Method;
use tracing::{debug, instrument};

use super::endpoint::join_url;
use super::response::error_from_response;
use crate::http::HttpClient;

/// Exchanges a refresh token at `POST {base_url}{refresh_endpoint}`
///
/// The request carries no `Authorization` header. Only a
/// `{"success": true, "data": {"accessToken": "..."}}` envelope with a
/// non-empty token counts as success.
#[derive(Debug, Clone)]
pub struct HttpRefreshClient {
    http: HttpClient,
    url: String,
}

impl HttpRefreshClient {
    /// Refresh client posting to the configured refresh endpoint
    pub fn new(http: HttpClient, config: &ClientConfig) -> Self {
        Self { http, url: join_url(&config.base_url, &config.refresh_endpoint) }
    }

    /// Absolute URL of the refresh endpoint
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RefreshTokenClient for HttpRefreshClient {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        let body = RefreshRequest { refresh_token: refresh_token.to_string() };
        let request = self.http.request(Method::POST, &self.url).json(&body);

        let response = self.http.send(request, None).await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%status, "refresh endpoint rejected the exchange");
            return Err(error_from_response(response).await);
        }

        let envelope: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::generic(format!("Malformed refresh response: {e}")))?;

        envelope
            .into_access_token()
            .ok_or_else(|| ApiError::generic("Refresh response did not contain an access token"))
    }
}
