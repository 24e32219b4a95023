//! Response body helpers for the JSON convenience methods

use authwire_domain::{ApiError, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::IntoApiError;

/// Deserialize a successful response, or turn an error status into
/// `ApiError::Api`.
///
/// 204/205 and empty bodies deserialize from `null`, so `()` and `Option<T>`
/// targets work for bodiless endpoints.
pub async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(response).await);
    }

    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return from_null(status);
    }

    let bytes = response.bytes().await.map_err(IntoApiError::into_api_error)?;
    if bytes.is_empty() {
        return from_null(status);
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::generic(format!("Failed to parse response: {e}")))
}

/// Build `ApiError::Api` from an error response, keeping its payload.
///
/// The message comes from the payload's `message` or `error` field when
/// present.
pub async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let data = parse_payload(&body);

    let message = data
        .as_ref()
        .and_then(payload_message)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    ApiError::api(status.as_u16(), message, data)
}

/// Non-JSON bodies are kept as a JSON string.
pub(crate) fn parse_payload(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

fn payload_message(data: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| data.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

fn from_null<T: DeserializeOwned>(status: StatusCode) -> Result<T> {
    serde_json::from_value(Value::Null).map_err(|_| {
        ApiError::generic(format!(
            "Empty response ({}), but response type cannot be deserialized from empty body",
            status.as_u16()
        ))
    })
}
