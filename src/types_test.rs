use super::*;
use serde_json::json;

#[test]
fn user_minimal_fields() {
    let user: User = serde_json::from_value(json!({ "id": "u1", "email": "a@b.com" })).unwrap();
    assert_eq!(user.id, "u1");
    assert!(user.name.is_none());
    assert!(user.created_at.is_none());
    assert_eq!(serde_json::to_value(&user).unwrap(), json!({ "id": "u1", "email": "a@b.com" }));
}

#[test]
fn user_uses_camel_case() {
    let user: User = serde_json::from_value(json!({
        "id": "u1", "email": "a@b.com", "name": "Ada", "createdAt": "2024-01-01T00:00:00Z"
    }))
    .unwrap();
    assert_eq!(user.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
}

#[test]
fn auth_response_decodes() {
    let resp: AuthResponse = serde_json::from_value(json!({
        "user": { "id": "u1", "email": "a@b.com" },
        "accessToken": "tok-1",
        "refreshToken": "ref-1"
    }))
    .unwrap();
    assert_eq!(resp.access_token, "tok-1");
    assert_eq!(resp.refresh_token, "ref-1");
}

#[test]
fn product_specifications_accept_strings_and_numbers() {
    let product: Product = serde_json::from_value(json!({
        "id": "p1", "name": "Phone", "brand": "Acme", "category": "phones", "price": 499.0,
        "specifications": { "ram": "8GB", "battery": 4500 }
    }))
    .unwrap();
    assert_eq!(product.specifications["ram"], json!("8GB"));
    assert_eq!(product.specifications["battery"], json!(4500));
    assert!(product.images.is_empty());
}

#[test]
fn product_list_defaults_page() {
    let list: ProductListResponse = serde_json::from_value(json!({ "success": true, "products": [] })).unwrap();
    assert_eq!(list.page, 1);
    assert_eq!(list.total, 0);
}

#[test]
fn order_status_lowercase() {
    assert_eq!(serde_json::to_value(OrderStatus::Shipped).unwrap(), json!("shipped"));
    let status: OrderStatus = serde_json::from_value(json!("cancelled")).unwrap();
    assert_eq!(status, OrderStatus::Cancelled);
}

#[test]
fn address_zip_code_camel_case() {
    let addr = Address {
        street: "1 Main St".into(),
        city: "Springfield".into(),
        state: "IL".into(),
        zip_code: "62701".into(),
        country: "US".into(),
    };
    assert_eq!(serde_json::to_value(&addr).unwrap()["zipCode"], json!("62701"));
}

#[test]
fn review_stats_distribution_keys() {
    let stats: ReviewStats = serde_json::from_value(json!({
        "productId": "p1", "averageRating": 4.5, "totalReviews": 2,
        "ratingDistribution": { "1": 0, "2": 0, "3": 0, "4": 1, "5": 1 }
    }))
    .unwrap();
    assert_eq!(stats.rating_distribution["5"], 1);
}
