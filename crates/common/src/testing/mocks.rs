//! Mock implementations of the client collaborators
//!
//! Provides mock objects for testing purposes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use authwire_domain::ApiError;
use parking_lot::Mutex;

use crate::auth::{LoginNavigator, RefreshTokenClient};

/// Mock refresh client that counts calls and replays scripted outcomes
#[derive(Debug, Clone)]
pub struct MockRefreshClient {
    fallback: Arc<Mutex<Result<String, ApiError>>>,
    scripted: Arc<Mutex<VecDeque<Result<String, ApiError>>>>,
    seen_tokens: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl MockRefreshClient {
    /// Mock that always returns `access_token`
    pub fn succeeding(access_token: impl Into<String>) -> Self {
        Self::with_fallback(Ok(access_token.into()))
    }

    /// Mock that always fails with `error`
    pub fn failing(error: ApiError) -> Self {
        Self::with_fallback(Err(error))
    }

    fn with_fallback(fallback: Result<String, ApiError>) -> Self {
        Self {
            fallback: Arc::new(Mutex::new(fallback)),
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            seen_tokens: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    /// Hold every refresh for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue an outcome used before the fallback
    pub fn push_outcome(&self, outcome: Result<String, ApiError>) {
        self.scripted.lock().push_back(outcome);
    }

    /// Number of refresh exchanges performed
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens received, in call order
    pub fn seen_refresh_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().clone()
    }
}

#[async_trait]
impl RefreshTokenClient for MockRefreshClient {
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens.lock().push(refresh_token.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = self.scripted.lock().pop_front();
        scripted.unwrap_or_else(|| self.fallback.lock().clone())
    }
}

/// Navigator that remembers where it was sent
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    current: Arc<Mutex<Option<String>>>,
    visits: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    /// Navigator that starts on no particular route
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigator that starts on `path`
    pub fn at(path: impl Into<String>) -> Self {
        let navigator = Self::default();
        *navigator.current.lock() = Some(path.into());
        navigator
    }

    /// Paths navigated to, in order
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }
}

impl LoginNavigator for RecordingNavigator {
    fn current_path(&self) -> Option<String> {
        self.current.lock().clone()
    }

    fn navigate_to(&self, path: &str) {
        *self.current.lock() = Some(path.to_string());
        self.visits.lock().push(path.to_string());
    }
}
