//! Navigator for environments without a login surface

use tracing::info;

use super::traits::LoginNavigator;

/// Navigator that only records the redirect in the log
///
/// Used by headless callers (CLIs, background jobs) where there is no login
/// page to show; the `SessionExpired` error is the only signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl LoginNavigator for NoopNavigator {
    fn current_path(&self) -> Option<String> {
        None
    }

    fn navigate_to(&self, path: &str) {
        info!(path, "Session expired; login required");
    }
}
