//! Domain services over the request pipeline.
//!
//! ARCHITECTURE
//! ============
//! Each service is a thin typed wrapper: build the path and body, call the
//! shared [`ApiClient`], decode the envelope. Token handling and error
//! shaping already happened in the pipeline. The only logic here is
//! client-side input validation that saves a round trip.

pub mod auth;
pub mod cart;
pub mod comparison;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

pub use auth::AuthService;
pub use cart::CartService;
pub use comparison::ComparisonService;
pub use orders::OrderService;
pub use products::ProductService;
pub use reviews::ReviewService;
pub use users::UserService;

use crate::api::{ApiClient, ApiError};

/// Every domain service sharing one pipeline.
#[derive(Debug, Clone)]
pub struct Services {
    pub auth: AuthService,
    pub products: ProductService,
    pub cart: CartService,
    pub orders: OrderService,
    pub comparison: ComparisonService,
    pub reviews: ReviewService,
    pub users: UserService,
}

impl Services {
    #[must_use]
    pub fn new(api: &ApiClient) -> Self {
        Self {
            auth: AuthService::new(api.clone()),
            products: ProductService::new(api.clone()),
            cart: CartService::new(api.clone()),
            orders: OrderService::new(api.clone()),
            comparison: ComparisonService::new(api.clone()),
            reviews: ReviewService::new(api.clone()),
            users: UserService::new(api.clone()),
        }
    }
}

/// Validate an identifier used as a single path segment.
pub(crate) fn path_segment<'a>(what: &str, id: &'a str) -> Result<&'a str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::invalid_request(format!("{what} is required")));
    }
    if id.contains(['/', '?', '#', '%']) || id.chars().any(char::is_whitespace) {
        return Err(ApiError::invalid_request(format!("{what} contains invalid characters")));
    }
    Ok(id)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
