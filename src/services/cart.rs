//! The signed-in user's cart. Every mutation returns the updated cart.

use serde_json::json;

use super::path_segment;
use crate::api::{ApiClient, ApiError, envelope};
use crate::types::Cart;

#[derive(Debug, Clone)]
pub struct CartService {
    api: ApiClient,
}

impl CartService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /api/cart`. `None` when the user has no cart yet.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn get(&self) -> Result<Option<Cart>, ApiError> {
        let resp = self.api.get("/api/cart", None).await?;
        envelope::data(resp)
    }

    /// `POST /api/cart/add`.
    ///
    /// # Errors
    ///
    /// `INVALID_REQUEST` for a zero quantity or unusable product id.
    pub async fn add_item(&self, product_id: &str, quantity: u32) -> Result<Cart, ApiError> {
        let body = item_body(product_id, quantity)?;
        let resp = self.api.post("/api/cart/add", Some(&body)).await?;
        envelope::data(resp)
    }

    /// `PUT /api/cart/update`.
    ///
    /// # Errors
    ///
    /// `INVALID_REQUEST` for a zero quantity; use [`CartService::remove_item`] instead.
    pub async fn update_item(&self, product_id: &str, quantity: u32) -> Result<Cart, ApiError> {
        let body = item_body(product_id, quantity)?;
        let resp = self.api.put("/api/cart/update", &body).await?;
        envelope::data(resp)
    }

    /// `DELETE /api/cart/remove/{productId}`.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn remove_item(&self, product_id: &str) -> Result<Cart, ApiError> {
        let product_id = path_segment("Product id", product_id)?;
        let resp = self.api.delete(&format!("/api/cart/remove/{product_id}")).await?;
        envelope::data(resp)
    }

    /// `DELETE /api/cart/clear`.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn clear(&self) -> Result<(), ApiError> {
        self.api.delete("/api/cart/clear").await?;
        Ok(())
    }
}

fn item_body(product_id: &str, quantity: u32) -> Result<serde_json::Value, ApiError> {
    let product_id = path_segment("Product id", product_id)?;
    if quantity == 0 {
        return Err(ApiError::invalid_request("Quantity must be at least 1"));
    }
    Ok(json!({ "productId": product_id, "quantity": quantity }))
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
