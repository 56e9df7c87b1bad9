//! Product catalog: listing, detail, search, facets.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::path_segment;
use crate::api::{ApiClient, ApiError, envelope};
use crate::types::{Category, Product, ProductFilters, ProductListResponse};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone)]
pub struct ProductService {
    api: ApiClient,
}

impl ProductService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /api/products` with the filters as query parameters.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn list(&self, filters: &ProductFilters, page: u32, limit: u32) -> Result<ProductListResponse, ApiError> {
        let query = list_query(filters, page, limit);
        let resp = self.api.get("/api/products", Some(&query)).await?;
        envelope::body(resp)
    }

    /// `GET /api/products/{id}`.
    ///
    /// # Errors
    ///
    /// `INVALID_REQUEST` for an unusable id; `404` when the product does not exist.
    pub async fn get(&self, id: &str) -> Result<Product, ApiError> {
        let id = path_segment("Product id", id)?;
        let resp = self.api.get(&format!("/api/products/{id}"), None).await?;
        envelope::data(resp)
    }

    /// `POST /api/products/search`.
    ///
    /// # Errors
    ///
    /// `INVALID_REQUEST` for a blank query.
    pub async fn search(&self, query: &str, page: u32) -> Result<ProductListResponse, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::invalid_request("Search query is required"));
        }
        let params = [("page", page.max(1).to_string()), ("limit", DEFAULT_PAGE_SIZE.to_string())];
        let body = json!({ "query": query });
        let resp = self.api.request(Method::POST, "/api/products/search", Some(&body), Some(&params)).await?;
        envelope::body(resp)
    }

    /// Category names from `GET /api/categories`.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        let resp = self.api.get("/api/categories", None).await?;
        let categories: Option<Vec<Category>> = envelope::data(resp)?;
        Ok(categories.unwrap_or_default().into_iter().map(|c| c.name).collect())
    }

    /// `GET /api/brands`.
    ///
    /// # Errors
    ///
    /// Returns the normalized pipeline error.
    pub async fn brands(&self) -> Result<Vec<String>, ApiError> {
        let resp = self.api.get("/api/brands", None).await?;
        let brands: Option<Vec<BrandEntry>> = envelope::data(resp)?;
        Ok(brands.unwrap_or_default().into_iter().map(BrandEntry::into_name).collect())
    }
}

/// Brands arrive either as plain strings or as `{ "name": ... }` records.
#[derive(Deserialize)]
#[serde(untagged)]
enum BrandEntry {
    Name(String),
    Record(Category),
}

impl BrandEntry {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) => name,
            Self::Record(c) => c.name,
        }
    }
}

fn list_query(filters: &ProductFilters, page: u32, limit: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![("page", page.max(1).to_string()), ("limit", limit.max(1).to_string())];
    let text = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned);

    if let Some(category) = text(&filters.category) {
        query.push(("category", category));
    }
    if let Some(brand) = text(&filters.brand) {
        query.push(("brand", brand));
    }
    if let Some(min) = filters.min_price {
        query.push(("minPrice", min.to_string()));
    }
    if let Some(max) = filters.max_price {
        query.push(("maxPrice", max.to_string()));
    }
    if let Some(search) = text(&filters.search_query) {
        query.push(("search", search));
    }
    query
}

#[cfg(test)]
#[path = "products_test.rs"]
mod tests;
