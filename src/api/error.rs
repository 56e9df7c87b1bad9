//! Normalized API error and the mapping from raw failures.
//!
//! DESIGN
//! ======
//! Callers of the pipeline only ever see [`ApiError`]. Every way a call can
//! go wrong is first captured as a [`Failure`] and then passed through
//! [`normalize`], an exhaustive match, so a new failure kind cannot reach
//! the UI without an explicit message and code.

use serde::Serialize;
use serde_json::{Map, Value};

/// Message used when neither the server nor the failure kind supplies one.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

pub const CODE_NETWORK: &str = "NETWORK_ERROR";
pub const CODE_TIMEOUT: &str = "TIMEOUT";
pub const CODE_INVALID_RESPONSE: &str = "INVALID_RESPONSE";
pub const CODE_STORAGE: &str = "STORAGE_ERROR";
pub const CODE_INVALID_REQUEST: &str = "INVALID_REQUEST";
/// 2xx response whose envelope reported `success: false` without a code.
pub const CODE_REJECTED: &str = "REJECTED";
pub const CODE_UNKNOWN: &str = "UNKNOWN";

/// The single error shape surfaced to callers.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable message, safe to show to the user.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), code: None, details: None }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.get_or_insert_with(Map::new).insert(key.to_owned(), value.into());
        self
    }

    /// Client-side validation failure; no request was sent.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(message).with_code(CODE_INVALID_REQUEST)
    }

    /// HTTP status carried in `code`, when the failure came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.code.as_deref().and_then(|c| c.parse().ok())
    }

    /// True for 401/403 responses, which mean the credentials are no longer usable.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// True when the server answered but refused the call through the envelope.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.code.as_deref() == Some(CODE_REJECTED)
    }
}

/// Raw failure before normalization.
#[derive(Debug)]
pub enum Failure {
    /// No response was received.
    Transport { message: String, timed_out: bool },
    /// Non-2xx status. `body` is the decoded JSON body, if any.
    Status { status: u16, body: Option<Value> },
    /// 2xx status with an envelope reporting `success: false`.
    Rejected { status: u16, body: Value },
    /// A response arrived but its body could not be decoded.
    Decode { status: Option<u16>, message: String },
    /// The durable store failed during a session-mutating operation.
    Persistence(String),
    /// The request could not be constructed.
    Build(String),
    Other(String),
}

/// Map any raw failure to the normalized error shape.
#[must_use]
pub fn normalize(failure: Failure) -> ApiError {
    match failure {
        Failure::Transport { message, timed_out: true } => {
            ApiError::new("The request timed out").with_code(CODE_TIMEOUT).with_detail("cause", message)
        }
        Failure::Transport { message, timed_out: false } => {
            ApiError::new("Unable to reach the server").with_code(CODE_NETWORK).with_detail("cause", message)
        }
        Failure::Status { status, body } => {
            let message = body
                .as_ref()
                .and_then(server_message)
                .unwrap_or_else(|| format!("Request failed with status {status}"));
            with_server_details(ApiError::new(message).with_code(status.to_string()), body.as_ref())
        }
        Failure::Rejected { status, body } => {
            let message = server_message(&body).unwrap_or_else(|| FALLBACK_MESSAGE.to_owned());
            let code = body.get("code").and_then(Value::as_str).unwrap_or(CODE_REJECTED);
            let err = ApiError::new(message).with_code(code).with_detail("status", status);
            with_server_details(err, Some(&body))
        }
        Failure::Decode { status, message } => {
            let err = ApiError::new("The server returned an unreadable response")
                .with_code(CODE_INVALID_RESPONSE)
                .with_detail("cause", message);
            match status {
                Some(status) => err.with_detail("status", status),
                None => err,
            }
        }
        Failure::Persistence(message) => {
            ApiError::new("Could not save your session on this device")
                .with_code(CODE_STORAGE)
                .with_detail("cause", message)
        }
        Failure::Build(message) => ApiError::new(message).with_code(CODE_INVALID_REQUEST),
        Failure::Other(message) => ApiError::new(FALLBACK_MESSAGE)
            .with_code(CODE_UNKNOWN)
            .with_detail("cause", message),
    }
}

/// Server-provided message: envelope `error`, then `message`. Blank strings are ignored.
pub(crate) fn server_message(body: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

fn with_server_details(mut err: ApiError, body: Option<&Value>) -> ApiError {
    if let Some(Value::Object(extra)) = body.and_then(|b| b.get("details")) {
        let details = err.details.get_or_insert_with(Map::new);
        for (k, v) in extra {
            details.insert(k.clone(), v.clone());
        }
    }
    err
}

impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            Self::Transport { message, timed_out: true }
        } else if err.is_builder() {
            Self::Build(message)
        } else if err.is_decode() {
            Self::Decode { status: err.status().map(|s| s.as_u16()), message }
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_redirect() {
            Self::Transport { message, timed_out: false }
        } else {
            Self::Other(message)
        }
    }
}

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        normalize(failure)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
