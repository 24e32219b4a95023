//! Authenticated API client with single-flight session renewal
//!
//! Every request goes through [`ApiClient::request`]: the URL is normalized,
//! the JSON content type is merged under the caller's headers and the stored
//! access token is attached. A 401 triggers at most one refresh (shared by all
//! concurrent callers) and one retry. When the session cannot be renewed the
//! tokens are cleared, the user is sent to the login surface and the caller
//! receives `ApiError::SessionExpired`.

use std::sync::Arc;

use authwire_common::auth::{
    KeyValueStorage, LoginNavigator, NoopNavigator, RefreshCoordinator, RefreshOutcome,
    RefreshTokenClient, TokenStore,
};
use authwire_domain::constants::JSON_CONTENT_TYPE;
use authwire_domain::{ApiError, ClientConfig, Tokens};
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::endpoint::{
    is_auth_endpoint, is_credential_endpoint, join_url, normalize_path, validate_base_url,
};
use super::options::RequestOptions;
use super::refresh::HttpRefreshClient;
use super::response;
use crate::http::HttpClient;

const NO_REFRESH_TOKEN: &str = "Session expired: no refresh token available";
const REFRESH_FAILED: &str = "Session expired: token refresh failed";

/// API client that keeps the session alive across expired access tokens
///
/// Share one instance (behind an `Arc`) between concurrent callers so they
/// also share its refresh coordinator.
pub struct ApiClient {
    http: HttpClient,
    config: ClientConfig,
    tokens: Arc<TokenStore>,
    refresher: Arc<dyn RefreshTokenClient>,
    navigator: Arc<dyn LoginNavigator>,
    coordinator: RefreshCoordinator,
    redirect_guard: Mutex<()>,
}

/// State of one logical request across its (at most two) dispatches
struct RequestContext {
    url: String,
    method: Method,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    signal: Option<CancellationToken>,
    bearer: Option<String>,
    refreshable: bool,
    retried: bool,
}

impl RequestContext {
    fn retry_with(&mut self, token: String) {
        self.bearer = Some(token);
        self.retried = true;
    }
}

impl ApiClient {
    /// Create a client with in-memory token storage and no navigation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP
    /// client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Self::builder().config(config).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Token store backing this client
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Persist a freshly issued token pair (after a login call, typically).
    pub fn set_session(&self, tokens: &Tokens) {
        self.tokens.save_tokens(&tokens.access_token, &tokens.refresh_token);
    }

    /// Forget the current session.
    pub fn clear_session(&self) {
        self.tokens.clear_tokens();
    }

    /// Execute a request against `endpoint`, renewing the session on 401.
    ///
    /// Any status other than a recoverable 401 is returned unchanged,
    /// including 4xx/5xx. A 401 from a login, register or refresh endpoint is
    /// returned as-is, as is a 401 on the retry.
    ///
    /// # Errors
    ///
    /// - `ApiError::SessionExpired` when the session could not be renewed
    /// - `ApiError::Connection` / `ApiError::Timeout` for transport failures
    /// - `ApiError::Generic` for anything else that prevented a response
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let mut ctx = self.prepare(endpoint, options);

        loop {
            let response = self.dispatch(&ctx).await?;

            if response.status() != StatusCode::UNAUTHORIZED || !ctx.refreshable || ctx.retried {
                return Ok(response);
            }

            debug!(url = %ctx.url, "received 401, renewing session");
            let token = self.renew_session(ctx.bearer.as_deref()).await?;
            ctx.retry_with(token);
        }
    }

    /// GET `endpoint` and deserialize the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let response = self.request(endpoint, RequestOptions::get()).await?;
        response::parse_json(response).await
    }

    /// POST `body` as JSON and deserialize the JSON response.
    pub async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(endpoint, RequestOptions::post().json(body)?).await?;
        response::parse_json(response).await
    }

    /// PUT `body` as JSON and deserialize the JSON response.
    pub async fn put_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(endpoint, RequestOptions::put().json(body)?).await?;
        response::parse_json(response).await
    }

    /// DELETE `endpoint`; bodiless responses deserialize into `()`.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let response = self.request(endpoint, RequestOptions::delete()).await?;
        response::parse_json(response).await
    }

    fn prepare(&self, endpoint: &str, options: RequestOptions) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        // Caller headers win over the default content type.
        headers.extend(options.headers);

        // Classify the same path that ends up on the wire.
        let path = normalize_path(endpoint);
        let bearer = if is_credential_endpoint(&path) { None } else { self.tokens.access_token() };

        RequestContext {
            url: join_url(&self.config.base_url, &path),
            method: options.method,
            headers,
            body: options.body,
            signal: options.signal,
            bearer,
            refreshable: !is_auth_endpoint(&path, &self.config.refresh_endpoint),
            retried: false,
        }
    }

    async fn dispatch(&self, ctx: &RequestContext) -> Result<Response, ApiError> {
        let mut headers = ctx.headers.clone();
        if let Some(token) = &ctx.bearer {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::generic("Stored access token is not a valid header value"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self.http.request(ctx.method.clone(), &ctx.url).headers(headers);
        if let Some(body) = &ctx.body {
            builder = builder.body(body.clone());
        }

        self.http.send(builder, ctx.signal.as_ref()).await
    }

    /// Obtain a usable access token after `rejected` drew a 401.
    async fn renew_session(&self, rejected: Option<&str>) -> Result<String, ApiError> {
        // Another caller may have rotated the token while this request was in
        // flight; reuse it instead of starting a second refresh.
        if let Some(current) = self.tokens.access_token() {
            if rejected != Some(current.as_str()) {
                debug!("access token already renewed, retrying with it");
                return Ok(current);
            }
        }

        match self.coordinator.run(|| self.refresh_access_token()).await {
            Ok(token) => Ok(token),
            Err(err) => {
                self.redirect_to_login();
                if err.is_session_expired() {
                    Err(err)
                } else {
                    Err(ApiError::session_expired(err.message()))
                }
            }
        }
    }

    /// Leader-side refresh: exchange the stored refresh token and persist the
    /// result, or clear the session.
    #[instrument(skip(self))]
    async fn refresh_access_token(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            warn!("no refresh token available, session cannot be renewed");
            self.tokens.clear_tokens();
            return Err(ApiError::session_expired(NO_REFRESH_TOKEN));
        };

        match self.refresher.refresh_access_token(&refresh_token).await {
            Ok(access_token) => {
                self.tokens.save_tokens(&access_token, &refresh_token);
                info!("access token refreshed");
                Ok(access_token)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.tokens.clear_tokens();
                Err(ApiError::session_expired(REFRESH_FAILED))
            }
        }
    }

    fn redirect_to_login(&self) {
        let _guard = self.redirect_guard.lock();
        let login_path = self.config.login_path.as_str();

        if self.navigator.current_path().as_deref() == Some(login_path) {
            debug!(%login_path, "already on login surface, not redirecting");
            return;
        }

        info!(%login_path, "session expired, redirecting to login");
        self.navigator.navigate_to(login_path);
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    http: Option<HttpClient>,
    storage: Option<Arc<dyn KeyValueStorage>>,
    tokens: Option<Arc<TokenStore>>,
    refresher: Option<Arc<dyn RefreshTokenClient>>,
    navigator: Option<Arc<dyn LoginNavigator>>,
}

impl ApiClientBuilder {
    /// Set the client configuration (required)
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a preconfigured HTTP client instead of one built from the config
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Persist tokens in `storage`; ignored when [`Self::token_store`] is set
    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Share an existing token store
    pub fn token_store(mut self, tokens: Arc<TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Override the refresh exchange (defaults to [`HttpRefreshClient`])
    pub fn refresh_client(mut self, refresher: Arc<dyn RefreshTokenClient>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Set the navigator used to reach the login surface
    pub fn navigator(mut self, navigator: Arc<dyn LoginNavigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if no configuration was supplied, the base
    /// URL is invalid or the HTTP client cannot be created.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config =
            self.config.ok_or_else(|| ApiError::config("API base URL is not configured"))?;
        validate_base_url(&config.base_url)?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = HttpClient::builder().timeout(config.timeout);
                if let Some(agent) = &config.user_agent {
                    builder = builder.user_agent(agent.clone());
                }
                builder.build()?
            }
        };

        let tokens = match (self.tokens, self.storage) {
            (Some(tokens), _) => tokens,
            (None, Some(storage)) => Arc::new(TokenStore::new(storage)),
            (None, None) => Arc::new(TokenStore::in_memory()),
        };

        let refresher = match self.refresher {
            Some(refresher) => refresher,
            None => Arc::new(HttpRefreshClient::new(http.clone(), &config)),
        };

        let navigator = self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator));

        Ok(ApiClient {
            http,
            config,
            tokens,
            refresher,
            navigator,
            coordinator: RefreshCoordinator::new(),
            redirect_guard: Mutex::new(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use authwire_common::testing::{MockRefreshClient, RecordingNavigator};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with(
        server: &MockServer,
        refresher: MockRefreshClient,
        navigator: RecordingNavigator,
    ) -> ApiClient {
        ApiClient::builder()
            .config(ClientConfig::new(server.uri()).unwrap().with_timeout(Duration::from_secs(5)))
            .refresh_client(Arc::new(refresher))
            .navigator(Arc::new(navigator))
            .build()
            .unwrap()
    }

    fn plain_client(server: &MockServer) -> ApiClient {
        client_with(server, MockRefreshClient::succeeding("unused"), RecordingNavigator::new())
    }

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Profile {
        name: String,
    }

    #[test]
    fn test_builder_requires_config() {
        let err = ApiClient::builder().build().unwrap_err();
        assert!(matches!(err, ApiError::Config { .. }));
    }

    #[test]
    fn test_builder_rejects_relative_base_url() {
        let config = ClientConfig::new("api.example.com").unwrap();
        assert!(matches!(ApiClient::new(config), Err(ApiError::Config { .. })));
    }

    #[tokio::test]
    async fn test_get_json_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer access-1"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "ada" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = plain_client(&server);
        client.set_session(&Tokens::new("access-1", "refresh-1"));

        let profile: Profile = client.get_json("me").await.unwrap();
        assert_eq!(profile, Profile { name: "ada".into() });
    }

    #[tokio::test]
    async fn test_caller_content_type_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header("content-type", "text/csv"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = plain_client(&server);
        let options = RequestOptions::post()
            .header(CONTENT_TYPE, HeaderValue::from_static("text/csv"))
            .body("a,b\n1,2\n");

        let response = client.request("/upload", options).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_error_status_is_returned_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "nope" })))
            .mount(&server)
            .await;

        let refresher = MockRefreshClient::succeeding("unused");
        let client = client_with(&server, refresher.clone(), RecordingNavigator::new());
        client.set_session(&Tokens::new("a", "r"));

        let response = client.request("/missing", RequestOptions::get()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(refresher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_get_json_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "nope" })))
            .mount(&server)
            .await;

        let client = plain_client(&server);

        let err = client.get_json::<Profile>("/missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "nope");
        assert_eq!(err.data(), Some(&json!({ "error": "nope" })));
    }

    #[tokio::test]
    async fn test_delete_with_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/items/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = plain_client(&server);

        let result: Result<(), ApiError> = client.delete("/items/7").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_401_refreshes_and_retries_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer new123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "ada" })))
            .expect(1)
            .mount(&server)
            .await;

        let refresher = MockRefreshClient::succeeding("new123");
        let client = client_with(&server, refresher.clone(), RecordingNavigator::new());
        client.set_session(&Tokens::new("stale", "refresh-1"));

        let profile: Profile = client.get_json("/me").await.unwrap();

        assert_eq!(profile.name, "ada");
        assert_eq!(refresher.call_count(), 1);
        assert_eq!(refresher.seen_refresh_tokens(), vec!["refresh-1".to_string()]);
        assert_eq!(client.tokens().access_token().as_deref(), Some("new123"));
        assert_eq!(client.tokens().refresh_token().as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_second_401_is_returned_without_another_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let refresher = MockRefreshClient::succeeding("new123");
        let navigator = RecordingNavigator::new();
        let client = client_with(&server, refresher.clone(), navigator.clone());
        client.set_session(&Tokens::new("stale", "refresh-1"));

        let response = client.request("/me", RequestOptions::get()).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(refresher.call_count(), 1);
        assert!(navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_expires_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let refresher = MockRefreshClient::failing(ApiError::api(500, "boom", None));
        let navigator = RecordingNavigator::at("/dashboard");
        let client = client_with(&server, refresher, navigator.clone());
        client.set_session(&Tokens::new("stale", "refresh-1"));

        let err = client.request("/me", RequestOptions::get()).await.unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(err.status(), Some(401));
        assert!(client.tokens().tokens().is_none());
        assert_eq!(navigator.visits(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_no_redirect_when_already_on_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let navigator = RecordingNavigator::at("/login");
        let client = client_with(
            &server,
            MockRefreshClient::failing(ApiError::generic("nope")),
            navigator.clone(),
        );
        client.set_session(&Tokens::new("stale", "refresh-1"));

        let err = client.request("/me", RequestOptions::get()).await.unwrap_err();

        assert!(err.is_session_expired());
        assert!(navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_missing_refresh_token_skips_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let refresher = MockRefreshClient::succeeding("never");
        let client = client_with(&server, refresher.clone(), RecordingNavigator::new());

        let err = client.request("/me", RequestOptions::get()).await.unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(refresher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_login_401_is_not_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "bad credentials" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let refresher = MockRefreshClient::succeeding("unused");
        let client = client_with(&server, refresher.clone(), RecordingNavigator::new());
        client.set_session(&Tokens::new("stale", "refresh-1"));

        let err = client
            .post_json::<_, serde_json::Value>("/auth/login", &json!({ "email": "a@b.c" }))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.message(), "bad credentials");
        assert!(!err.is_session_expired());
        assert_eq!(refresher.call_count(), 0);
        assert_eq!(client.tokens().access_token().as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_login_request_has_no_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = plain_client(&server);
        client.set_session(&Tokens::new("stale", "refresh-1"));

        let _: serde_json::Value =
            client.post_json("/auth/login", &json!({ "email": "a@b.c" })).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_unslashed_login_is_treated_as_credential_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "bad credentials" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let refresher = MockRefreshClient::succeeding("unused");
        let navigator = RecordingNavigator::new();
        let client = client_with(&server, refresher.clone(), navigator.clone());
        client.set_session(&Tokens::new("stale", "refresh-1"));

        let err = client
            .post_json::<_, serde_json::Value>("auth/login", &json!({ "email": "a@b.c" }))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(!err.is_session_expired());
        assert_eq!(refresher.call_count(), 0);
        assert!(navigator.visits().is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_unslashed_refresh_endpoint_is_not_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let refresher = MockRefreshClient::succeeding("unused");
        let client = client_with(&server, refresher.clone(), RecordingNavigator::new());
        client.set_session(&Tokens::new("stale", "refresh-1"));

        let response = client.request("auth/refresh", RequestOptions::post()).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(refresher.call_count(), 0);
        assert_eq!(client.tokens().access_token().as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_clear_session() {
        let server = MockServer::start().await;
        let client = plain_client(&server);

        client.set_session(&Tokens::new("a", "r"));
        client.clear_session();
        client.clear_session();

        assert!(client.tokens().tokens().is_none());
    }
}
