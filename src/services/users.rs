//! Profile and shopping preferences of the signed-in user.

use serde_json::Value;

use crate::api::{ApiClient, ApiError, envelope};
use crate::types::{User, UserPreferences};

#[derive(Debug, Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /api/users/profile`.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn profile(&self) -> Result<Option<User>, ApiError> {
        let resp = self.api.get("/api/users/profile", None).await?;
        envelope::data(resp)
    }

    /// `PUT /api/users/profile` with a partial update object.
    ///
    /// # Errors
    ///
    /// `INVALID_REQUEST` when `changes` is not a JSON object.
    pub async fn update_profile(&self, changes: &Value) -> Result<User, ApiError> {
        if !changes.is_object() {
            return Err(ApiError::invalid_request("Profile update must be an object"));
        }
        let resp = self.api.put("/api/users/profile", changes).await?;
        envelope::data(resp)
    }

    /// `GET /api/users/preferences`.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn preferences(&self) -> Result<Option<UserPreferences>, ApiError> {
        let resp = self.api.get("/api/users/preferences", None).await?;
        envelope::data(resp)
    }

    /// `PUT /api/users/preferences`.
    ///
    /// # Errors
    ///
    /// `INVALID_REQUEST` for an inverted price range.
    pub async fn update_preferences(&self, preferences: &UserPreferences) -> Result<UserPreferences, ApiError> {
        if let Some(range) = preferences.price_range {
            if range.min > range.max {
                return Err(ApiError::invalid_request("Minimum price must not exceed maximum price"));
            }
        }
        let body = serde_json::to_value(preferences).map_err(|e| ApiError::invalid_request(e.to_string()))?;
        let resp = self.api.put("/api/users/preferences", &body).await?;
        envelope::data(resp)
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
