use super::*;
use crate::api::error::CODE_INVALID_REQUEST;
use crate::test_helpers::{cart_json, client_for, ok, spawn_server};
use crate::types::OrderStatus;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

fn address() -> Address {
    Address {
        street: "1 Main St".into(),
        city: "Springfield".into(),
        state: "IL".into(),
        zip_code: "62701".into(),
        country: "US".into(),
    }
}

fn order_json(id: &str, address: &Value, payment: &Value) -> Value {
    json!({
        "id": id,
        "userId": "u1",
        "items": cart_json("p1", 2)["items"],
        "totalAmount": 998.0,
        "status": "pending",
        "shippingAddress": address,
        "paymentMethod": payment,
        "createdAt": "2024-01-02T00:00:00Z",
    })
}

async fn create(Json(body): Json<Value>) -> Json<Value> {
    ok(order_json("o1", &body["shippingAddress"], &body["paymentMethod"]))
}

async fn list() -> Json<Value> {
    let addr = serde_json::to_value(address()).unwrap_or_default();
    ok(json!([order_json("o1", &addr, &json!("card")), order_json("o2", &addr, &json!("paypal"))]))
}

async fn detail(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if id == "o1" {
        let addr = serde_json::to_value(address()).unwrap_or_default();
        (StatusCode::OK, ok(order_json("o1", &addr, &json!("card"))))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "success": false, "error": "Order not found" })))
    }
}

async fn router() -> OrderService {
    let router = Router::new()
        .route("/api/orders", get(list).post(create))
        .route("/api/orders/{id}", get(detail));
    OrderService::new(client_for(&spawn_server(router).await))
}

#[tokio::test]
async fn create_sends_address_and_payment() {
    let orders = router().await;
    let order = orders.create(&address(), "card").await.unwrap();
    assert_eq!(order.id, "o1");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.shipping_address, address());
    assert_eq!(order.payment_method, "card");
    assert_eq!(order.items[0].quantity, 2);
}

#[tokio::test]
async fn list_returns_orders() {
    let orders = router().await;
    let all = orders.list().await.unwrap();
    let ids: Vec<_> = all.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["o1", "o2"]);
}

#[tokio::test]
async fn get_unknown_order_is_404() {
    let orders = router().await;
    assert_eq!(orders.get("o1").await.unwrap().id, "o1");
    let err = orders.get("o9").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message, "Order not found");
}

#[tokio::test]
async fn incomplete_address_lists_missing_fields() {
    let orders = OrderService::new(client_for("http://127.0.0.1:9"));
    let incomplete = Address { city: String::new(), zip_code: " ".into(), ..address() };
    let err = orders.create(&incomplete, "card").await.unwrap_err();
    assert_eq!(err.code.as_deref(), Some(CODE_INVALID_REQUEST));
    let details = err.details.unwrap();
    assert_eq!(details["missing"], json!(["city", "zipCode"]));
}

#[tokio::test]
async fn blank_payment_method_is_rejected() {
    let orders = OrderService::new(client_for("http://127.0.0.1:9"));
    let err = orders.create(&address(), "  ").await.unwrap_err();
    assert_eq!(err.code.as_deref(), Some(CODE_INVALID_REQUEST));
}

#[test]
fn country_is_optional_for_validation() {
    let address = Address { country: String::new(), ..address() };
    assert!(validate_address(&address).is_ok());
}
