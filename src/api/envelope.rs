//! Response envelope handling.
//!
//! Every endpoint answers with `{ success, data?, error? }`. A response is a
//! failure when the status is not 2xx or the envelope says `success: false`.
//! Bodies that are not envelopes (no `success` member) pass through as-is.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, Failure, normalize};

/// Turn a status and raw body text into the decoded body or a raw failure.
///
/// An empty 2xx body decodes to `Value::Null`.
pub(crate) fn interpret(status: u16, text: &str) -> Result<Value, Failure> {
    let ok = (200..300).contains(&status);
    let body = if text.trim().is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(text) {
            Ok(v) => Some(v),
            // Error pages from proxies are often HTML; the status is what matters there.
            Err(_) if !ok => None,
            Err(e) => return Err(Failure::Decode { status: Some(status), message: e.to_string() }),
        }
    };

    if !ok {
        return Err(Failure::Status { status, body });
    }
    match body {
        None => Ok(Value::Null),
        Some(body) if body.get("success").and_then(Value::as_bool) == Some(false) => {
            Err(Failure::Rejected { status, body })
        }
        Some(body) => Ok(body),
    }
}

/// Decode the envelope's `data` member.
///
/// # Errors
///
/// Returns an `INVALID_RESPONSE` error when `data` is missing or has the wrong shape.
pub fn data<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    let Value::Object(mut map) = body else {
        return Err(decode_error("response is not a JSON object"));
    };
    let data = map.remove("data").unwrap_or(Value::Null);
    serde_json::from_value(data).map_err(|e| decode_error(&e.to_string()))
}

/// Decode the whole envelope, for endpoints whose payload sits beside `success`.
///
/// # Errors
///
/// Returns an `INVALID_RESPONSE` error when the body has the wrong shape.
pub fn body<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| decode_error(&e.to_string()))
}

fn decode_error(message: &str) -> ApiError {
    normalize(Failure::Decode { status: None, message: message.to_owned() })
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
