//! Authenticated request pipeline.
//!
//! ARCHITECTURE
//! ============
//! One `ApiClient` is shared (cheaply cloned) by every domain service. It
//! owns the only mutable "current access token". Each outgoing request reads
//! the token once, while it is being built, so a token change never affects
//! a request that is already built or in flight.
//!
//! ERROR HANDLING
//! ==============
//! Transport errors, non-2xx statuses, `success: false` envelopes and
//! undecodable bodies all leave this module as [`ApiError`] via
//! [`error::normalize`]. No retries happen here.

pub mod envelope;
pub mod error;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::config::ApiConfig;
pub use error::{ApiError, Failure, normalize};

/// Query-string pairs appended to a request.
pub type Query<'a> = &'a [(&'a str, String)];

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("has_token", &self.access_token().is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a pipeline for `config.base_url` with no token set.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| normalize(Failure::Build(e.to_string())))?;
        Ok(Self {
            inner: Arc::new(Inner { http, base_url: config.base_url.clone(), token: RwLock::new(None) }),
        })
    }

    /// Replace the token used for all subsequently built requests.
    pub fn set_access_token(&self, token: Option<String>) {
        let has_token = token.is_some();
        *self.inner.token.write().unwrap_or_else(PoisonError::into_inner) = token;
        tracing::debug!(has_token, "api access token updated");
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.inner.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Build an outgoing request, attaching the current token as a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns an `INVALID_REQUEST` error if the URL or a header cannot be encoded.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<Query<'_>>,
    ) -> Result<reqwest::Request, ApiError> {
        let mut builder = self.inner.http.request(method, self.url(path));
        if let Some(token) = self.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.build().map_err(|e| normalize(Failure::from(e)))
    }

    /// Send a request and return the decoded response body.
    ///
    /// # Errors
    ///
    /// Every failure is returned as a normalized [`ApiError`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<Query<'_>>,
    ) -> Result<Value, ApiError> {
        let request = self.build_request(method.clone(), path, body, query)?;
        let response = self.inner.http.execute(request).await;
        let response = response.map_err(|e| log_failure(&method, path, Failure::from(e)))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| log_failure(&method, path, Failure::from(e)))?;
        tracing::debug!(%method, path, status, "api response");

        envelope::interpret(status, &text).map_err(|f| log_failure(&method, path, f))
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, path: &str, query: Option<Query<'_>>) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None, query).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        self.request(Method::POST, path, body, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, Some(body), None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None, None).await
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.inner.base_url)
        } else {
            format!("{}/{path}", self.inner.base_url)
        }
    }
}

fn log_failure(method: &Method, path: &str, failure: Failure) -> ApiError {
    let err = normalize(failure);
    tracing::warn!(%method, path, code = err.code.as_deref().unwrap_or("-"), error = %err, "api request failed");
    err
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
