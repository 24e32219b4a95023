//! Conversions from transport errors into the client error taxonomy.
//!
//! `ApiError` lives in the domain crate and `reqwest::Error` is foreign, so
//! the mapping is an extension trait on the infrastructure side instead of a
//! `From` impl.

use authwire_domain::ApiError;
use reqwest::Error as HttpError;

/// Extension trait to make the conversion logic explicit at call sites.
pub trait IntoApiError {
    fn into_api_error(self) -> ApiError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

impl IntoApiError for HttpError {
    fn into_api_error(self) -> ApiError {
        if self.is_timeout() {
            return ApiError::timeout(self.to_string());
        }

        if is_connectivity_error(&self) {
            return ApiError::connection(format!("Unable to reach the server: {self}"));
        }

        // Builder, body, decode and redirect failures are local problems.
        ApiError::generic(self.to_string())
    }
}

fn is_connectivity_error(err: &HttpError) -> bool {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    err.is_request()
}
