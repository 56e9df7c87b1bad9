//! Product reviews and rating statistics.

use serde_json::json;

use super::path_segment;
use crate::api::{ApiClient, ApiError, envelope};
use crate::types::{Review, ReviewPage, ReviewStats};

pub const REVIEWS_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct ReviewService {
    api: ApiClient,
}

impl ReviewService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /api/reviews/product/{id}`, ten per page.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn for_product(&self, product_id: &str, page: u32) -> Result<ReviewPage, ApiError> {
        let product_id = path_segment("Product id", product_id)?;
        let query = [("page", page.max(1).to_string()), ("limit", REVIEWS_PAGE_SIZE.to_string())];
        let resp = self.api.get(&format!("/api/reviews/product/{product_id}"), Some(&query)).await?;
        envelope::body(resp)
    }

    /// `POST /api/reviews`.
    ///
    /// # Errors
    ///
    /// `INVALID_REQUEST` for a rating outside 1..=5 or a blank title/content.
    pub async fn create(&self, product_id: &str, rating: u8, title: &str, content: &str) -> Result<Review, ApiError> {
        let product_id = path_segment("Product id", product_id)?;
        if !(1..=5).contains(&rating) {
            return Err(ApiError::invalid_request("Rating must be between 1 and 5").with_detail("rating", rating));
        }
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(ApiError::invalid_request("Review title and content are required"));
        }
        let body = json!({
            "productId": product_id,
            "rating": rating,
            "title": title.trim(),
            "content": content.trim(),
        });
        let resp = self.api.post("/api/reviews", Some(&body)).await?;
        envelope::data(resp)
    }

    /// `GET /api/reviews/stats/{id}`. `None` when the product has no stats.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn stats(&self, product_id: &str) -> Result<Option<ReviewStats>, ApiError> {
        let product_id = path_segment("Product id", product_id)?;
        let resp = self.api.get(&format!("/api/reviews/stats/{product_id}"), None).await?;
        envelope::data(resp)
    }

    /// `POST /api/reviews/{id}/helpful`.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn mark_helpful(&self, review_id: &str) -> Result<Review, ApiError> {
        let review_id = path_segment("Review id", review_id)?;
        let resp = self.api.post(&format!("/api/reviews/{review_id}/helpful"), None).await?;
        envelope::data(resp)
    }
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
