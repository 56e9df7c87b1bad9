//! Side-by-side product comparison.

use std::collections::HashSet;

use serde_json::{Value, json};

use crate::api::{ApiClient, ApiError, envelope};
use crate::types::ComparisonResult;

pub const MIN_COMPARE: usize = 2;
pub const MAX_COMPARE: usize = 5;

#[derive(Debug, Clone)]
pub struct ComparisonService {
    api: ApiClient,
}

impl ComparisonService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `POST /api/comparison/compare`.
    ///
    /// # Errors
    ///
    /// `INVALID_REQUEST` unless there are 2 to 5 distinct, non-blank ids.
    pub async fn compare(&self, product_ids: &[String]) -> Result<ComparisonResult, ApiError> {
        let ids = distinct_ids(product_ids)?;
        let body = json!({ "productIds": ids });
        let resp = self.api.post("/api/comparison/compare", Some(&body)).await?;
        envelope::data(resp)
    }

    /// `GET /api/comparison/history`. Entries are returned as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn history(&self, limit: u32) -> Result<Vec<Value>, ApiError> {
        let query = [("limit", limit.max(1).to_string())];
        let resp = self.api.get("/api/comparison/history", Some(&query)).await?;
        let entries: Option<Vec<Value>> = envelope::data(resp)?;
        Ok(entries.unwrap_or_default())
    }
}

/// Trimmed ids in first-seen order, duplicates dropped.
fn distinct_ids(product_ids: &[String]) -> Result<Vec<&str>, ApiError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(product_ids.len());
    for id in product_ids.iter().map(|id| id.trim()) {
        if id.is_empty() {
            return Err(ApiError::invalid_request("Product ids must not be blank"));
        }
        if seen.insert(id) {
            ids.push(id);
        }
    }
    if !(MIN_COMPARE..=MAX_COMPARE).contains(&ids.len()) {
        let message = format!("Select between {MIN_COMPARE} and {MAX_COMPARE} products to compare");
        return Err(ApiError::invalid_request(message).with_detail("count", ids.len()));
    }
    Ok(ids)
}

#[cfg(test)]
#[path = "comparison_test.rs"]
mod tests;
