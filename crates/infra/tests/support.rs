//! Shared helpers for the infra integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use authwire_common::testing::RecordingNavigator;
use authwire_domain::{ClientConfig, Tokens};
use authwire_infra::{init_tracing, ApiClient, LogFormat};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REFRESH_PATH: &str = "/auth/refresh";

/// Client wired to `server` with the real HTTP refresh exchange.
pub struct TestClient {
    pub client: Arc<ApiClient>,
    pub navigator: RecordingNavigator,
}

impl TestClient {
    pub fn new(server: &MockServer) -> Self {
        Self::with_config(ClientConfig::new(server.uri()).expect("config"))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        init_tracing(LogFormat::Pretty);

        let navigator = RecordingNavigator::at("/dashboard");
        let client = ApiClient::builder()
            .config(config)
            .navigator(Arc::new(navigator.clone()))
            .build()
            .expect("client should build");

        Self { client: Arc::new(client), navigator }
    }

    pub fn signed_in(self, access: &str, refresh: &str) -> Self {
        self.client.set_session(&Tokens::new(access, refresh));
        self
    }
}

/// Refresh endpoint answering with `access_token` after `delay`.
pub async fn mount_refresh_success(server: &MockServer, access_token: &str, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": { "accessToken": access_token } }))
                .set_delay(delay),
        )
        .expect(1)
        .named("refresh")
        .mount(server)
        .await;
}

/// Refresh endpoint failing with `status` after `delay`.
pub async fn mount_refresh_failure(server: &MockServer, status: u16, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(json!({ "success": false, "message": "refresh rejected" }))
                .set_delay(delay),
        )
        .expect(1)
        .named("refresh")
        .mount(server)
        .await;
}

/// Requests the server received on `route`.
pub async fn requests_to(server: &MockServer, route: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == route)
        .collect()
}

/// Address of a port nobody listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener); // release the port so that requests fail with ECONNREFUSED
    format!("http://{addr}")
}
