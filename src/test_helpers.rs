//! Shared fixtures for unit tests: an in-process HTTP server and sample records.

use std::path::PathBuf;

use crate::api::ApiClient;
use crate::config::{ApiConfig, Timeouts};
use crate::types::User;

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server failed");
    });
    format!("http://{addr}")
}

pub(crate) fn client_for(base_url: &str) -> ApiClient {
    client_with_timeout(base_url, Timeouts::default())
}

pub(crate) fn client_with_timeout(base_url: &str, timeouts: Timeouts) -> ApiClient {
    let config = ApiConfig::new(base_url, timeouts).expect("valid base url");
    ApiClient::new(&config).expect("http client")
}

pub(crate) fn sample_user() -> User {
    User {
        id: "u1".into(),
        email: "a@b.com".into(),
        name: Some("Ada".into()),
        created_at: Some("2024-01-01T00:00:00Z".into()),
    }
}

/// A fresh directory under the OS temp dir; not created.
pub(crate) fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("storefront-test-{}", uuid::Uuid::new_v4()))
}

/// Wire JSON for a product with the given id.
pub(crate) fn product_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": format!("Phone {id}"),
        "brand": "Acme",
        "category": "phones",
        "price": 499.0,
        "images": [],
        "specifications": { "ram": "8GB", "battery": 4500 },
        "stock": 3
    })
}

/// Wire JSON for a cart holding `quantity` of one product.
pub(crate) fn cart_json(product_id: &str, quantity: u32) -> serde_json::Value {
    serde_json::json!({
        "id": "c1",
        "userId": "u1",
        "items": [{
            "id": "ci1",
            "product": product_json(product_id),
            "quantity": quantity,
            "price": 499.0
        }],
        "totalPrice": 499.0 * f64::from(quantity)
    })
}

/// Wrap `data` in a success envelope.
pub(crate) fn ok(data: serde_json::Value) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "success": true, "data": data }))
}
