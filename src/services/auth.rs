//! Auth endpoints: register, login, logout, refresh.
//!
//! These calls only talk to the server. Persisting the returned credentials
//! and updating the pipeline token is `app::Storefront`'s job.

use serde_json::json;

use crate::api::{ApiClient, ApiError, envelope};
use crate::types::{AuthResponse, TokenPair};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `POST /api/auth/register`.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_REQUEST` for a malformed email or weak password,
    /// otherwise the normalized server/transport error.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        validate_email(email)?;
        validate_new_password(password)?;
        let body = json!({ "email": email.trim(), "password": password });
        let resp = self.api.post("/api/auth/register", Some(&body)).await?;
        envelope::data(resp)
    }

    /// `POST /api/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_REQUEST` when email or password is blank.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::invalid_request("Email and password are required"));
        }
        let body = json!({ "email": email.trim(), "password": password });
        let resp = self.api.post("/api/auth/login", Some(&body)).await?;
        envelope::data(resp)
    }

    /// `POST /api/auth/logout`. Revokes the refresh token server-side.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; callers usually ignore it.
    pub async fn logout(&self, user_id: &str, refresh_token: &str) -> Result<(), ApiError> {
        let body = json!({ "userId": user_id, "refreshToken": refresh_token });
        self.api.post("/api/auth/logout", Some(&body)).await?;
        Ok(())
    }

    /// `POST /api/auth/refresh`.
    ///
    /// # Errors
    ///
    /// A 401/403 means the refresh token is no longer accepted.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let body = json!({ "refreshToken": refresh_token });
        let resp = self.api.post("/api/auth/refresh", Some(&body)).await?;
        envelope::data(resp)
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::invalid_request("Email is required"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::invalid_request("Email address is invalid")),
    }
}

/// Registration password rule: length, upper, lower, digit.
pub(crate) fn validate_new_password(password: &str) -> Result<(), ApiError> {
    let problem = if password.chars().count() < MIN_PASSWORD_LEN {
        Some("Password must be at least 8 characters")
    } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
        Some("Password must contain an uppercase letter")
    } else if !password.chars().any(|c| c.is_ascii_lowercase()) {
        Some("Password must contain a lowercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("Password must contain a number")
    } else {
        None
    };
    problem.map_or(Ok(()), |msg| Err(ApiError::invalid_request(msg)))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
