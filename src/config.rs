//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const STATE_DIR_NAME: &str = "storefront";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Settings for the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base endpoint without a trailing slash.
    pub base_url: String,
    pub timeouts: Timeouts,
}

impl ApiConfig {
    /// Validate and normalize a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless `base_url` is an absolute
    /// `http`/`https` URL.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = reqwest::Url::parse(trimmed)
            .map_err(|e| ConfigError::InvalidBaseUrl { url: base_url.to_owned(), reason: e.to_string() })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(Self { base_url: trimmed.to_owned(), timeouts })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api: ApiConfig,
    /// Directory holding the durable session store.
    pub state_dir: PathBuf,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `STOREFRONT_API_URL`: default `http://localhost:3000`
    /// - `STOREFRONT_REQUEST_TIMEOUT_SECS`: default 30
    /// - `STOREFRONT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STOREFRONT_STATE_DIR`: default `<config dir>/storefront`
    ///
    /// # Errors
    ///
    /// Returns an error if `STOREFRONT_API_URL` is not a valid http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not a valid http(s) URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("STOREFRONT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let timeouts = Timeouts {
            request_secs: parse_u64(lookup("STOREFRONT_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("STOREFRONT_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let api = ApiConfig::new(&base_url, timeouts)?;
        let state_dir = lookup("STOREFRONT_STATE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(default_state_dir, PathBuf::from);
        Ok(Self { api, state_dir })
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).filter(|v| *v > 0).unwrap_or(default)
}

fn default_state_dir() -> PathBuf {
    dirs::config_dir().map_or_else(|| PathBuf::from(".storefront"), |dir| dir.join(STATE_DIR_NAME))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
