//! Checkout and order history.

use serde_json::json;

use super::path_segment;
use crate::api::{ApiClient, ApiError, envelope};
use crate::types::{Address, Order};

#[derive(Debug, Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `POST /api/orders`. The server builds the order from the current cart.
    ///
    /// # Errors
    ///
    /// `INVALID_REQUEST` for an incomplete address or blank payment method.
    pub async fn create(&self, shipping_address: &Address, payment_method: &str) -> Result<Order, ApiError> {
        validate_address(shipping_address)?;
        if payment_method.trim().is_empty() {
            return Err(ApiError::invalid_request("Payment method is required"));
        }
        let body = json!({ "shippingAddress": shipping_address, "paymentMethod": payment_method.trim() });
        let resp = self.api.post("/api/orders", Some(&body)).await?;
        envelope::data(resp)
    }

    /// `GET /api/orders`.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn list(&self) -> Result<Vec<Order>, ApiError> {
        let resp = self.api.get("/api/orders", None).await?;
        let orders: Option<Vec<Order>> = envelope::data(resp)?;
        Ok(orders.unwrap_or_default())
    }

    /// `GET /api/orders/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn get(&self, id: &str) -> Result<Order, ApiError> {
        let id = path_segment("Order id", id)?;
        let resp = self.api.get(&format!("/api/orders/{id}"), None).await?;
        envelope::data(resp)
    }
}

fn validate_address(address: &Address) -> Result<(), ApiError> {
    let missing: Vec<&str> = [
        ("street", &address.street),
        ("city", &address.city),
        ("state", &address.state),
        ("zipCode", &address.zip_code),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(ApiError::invalid_request("Please fill in all address fields").with_detail("missing", missing))
}

#[cfg(test)]
#[path = "orders_test.rs"]
mod tests;
