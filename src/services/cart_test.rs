use super::*;
use crate::api::error::{CODE_INVALID_REQUEST, CODE_NETWORK};
use crate::test_helpers::{cart_json, client_for, ok, spawn_server};
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer T1")
}

async fn show(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "success": false, "error": "Unauthorized" })));
    }
    (StatusCode::OK, ok(cart_json("p1", 1)))
}

async fn add(Json(body): Json<Value>) -> Json<Value> {
    let product = body["productId"].as_str().unwrap_or_default().to_owned();
    let quantity = body["quantity"].as_u64().unwrap_or_default();
    ok(cart_json(&product, u32::try_from(quantity).unwrap_or(0)))
}

async fn remove(Path(product_id): Path<String>) -> Json<Value> {
    let mut cart = cart_json(&product_id, 1);
    cart["items"] = json!([]);
    cart["totalPrice"] = json!(0.0);
    ok(cart)
}

async fn router() -> CartService {
    let router = Router::new()
        .route("/api/cart", get(show))
        .route("/api/cart/add", post(add))
        .route("/api/cart/update", put(add))
        .route("/api/cart/remove/{product_id}", delete(remove))
        .route("/api/cart/clear", delete(|| async { StatusCode::NO_CONTENT }));
    let api = client_for(&spawn_server(router).await);
    api.set_access_token(Some("T1".into()));
    CartService::new(api)
}

#[tokio::test]
async fn get_sends_bearer_token() {
    let cart = router().await;
    let current = cart.get().await.unwrap().unwrap();
    assert_eq!(current.items.len(), 1);
    assert_eq!(current.items[0].product.id, "p1");
}

#[tokio::test]
async fn get_without_token_is_unauthorized() {
    let cart = router().await;
    cart.api.set_access_token(None);
    let err = cart.get().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.message, "Unauthorized");
}

#[tokio::test]
async fn missing_cart_is_none() {
    let router = Router::new().route("/api/cart", get(|| async { ok(Value::Null) }));
    let cart = CartService::new(client_for(&spawn_server(router).await));
    assert!(cart.get().await.unwrap().is_none());
}

#[tokio::test]
async fn add_item_posts_product_and_quantity() {
    let cart = router().await;
    let updated = cart.add_item("p9", 3).await.unwrap();
    assert_eq!(updated.items[0].product.id, "p9");
    assert_eq!(updated.items[0].quantity, 3);
    assert!((updated.total_price - 1497.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn update_item_puts_new_quantity() {
    let cart = router().await;
    let updated = cart.update_item("p1", 2).await.unwrap();
    assert_eq!(updated.items[0].quantity, 2);
}

#[tokio::test]
async fn remove_item_uses_path() {
    let cart = router().await;
    let updated = cart.remove_item("p1").await.unwrap();
    assert!(updated.items.is_empty());
}

#[tokio::test]
async fn clear_accepts_empty_body() {
    let cart = router().await;
    cart.clear().await.unwrap();
}

#[tokio::test]
async fn zero_quantity_is_rejected_before_sending() {
    let cart = CartService::new(client_for("http://127.0.0.1:9"));
    for err in [cart.add_item("p1", 0).await.unwrap_err(), cart.update_item("p1", 0).await.unwrap_err()] {
        assert_eq!(err.code.as_deref(), Some(CODE_INVALID_REQUEST));
    }
    // A valid call does reach the (unreachable) network.
    let err = cart.add_item("p1", 1).await.unwrap_err();
    assert_eq!(err.code.as_deref(), Some(CODE_NETWORK));
}
