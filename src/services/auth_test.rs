use super::*;
use crate::api::error::CODE_INVALID_REQUEST;
use crate::test_helpers::{client_for, ok, sample_user, spawn_server};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

const UNREACHABLE: &str = "http://127.0.0.1:9";

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "Secret123" {
        let data = json!({
            "user": sample_user(),
            "accessToken": "acc-1",
            "refreshToken": "ref-1",
        });
        (StatusCode::OK, ok(data))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "success": false, "error": "Invalid credentials" })))
    }
}

async fn refresh(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["refreshToken"] == "ref-1" {
        (StatusCode::OK, ok(json!({ "accessToken": "acc-2", "refreshToken": "ref-2" })))
    } else {
        (StatusCode::FORBIDDEN, Json(json!({ "success": false, "error": "Refresh token revoked" })))
    }
}

async fn logout(Json(body): Json<Value>) -> StatusCode {
    if body["userId"] == "u1" && body["refreshToken"] == "ref-1" {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::BAD_REQUEST
    }
}

async fn server() -> AuthService {
    let router = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout));
    AuthService::new(client_for(&spawn_server(router).await))
}

// =============================================================================
// Server round trips
// =============================================================================

#[tokio::test]
async fn login_returns_credentials() {
    let auth = server().await;
    let resp = auth.login("a@b.com", "Secret123").await.unwrap();
    assert_eq!(resp.user, sample_user());
    assert_eq!(resp.access_token, "acc-1");
    assert_eq!(resp.refresh_token, "ref-1");
}

#[tokio::test]
async fn login_does_not_touch_pipeline_token() {
    let auth = server().await;
    auth.login("a@b.com", "Secret123").await.unwrap();
    assert!(auth.api.access_token().is_none());
}

#[tokio::test]
async fn wrong_password_is_401() {
    let auth = server().await;
    let err = auth.login("a@b.com", "nope").await.unwrap_err();
    assert_eq!(err.message, "Invalid credentials");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn register_posts_credentials() {
    let auth = server().await;
    let resp = auth.register("a@b.com", "Secret123").await.unwrap();
    assert_eq!(resp.access_token, "acc-1");
}

#[tokio::test]
async fn refresh_returns_new_pair() {
    let auth = server().await;
    let pair = auth.refresh("ref-1").await.unwrap();
    assert_eq!(pair, TokenPair { access_token: "acc-2".into(), refresh_token: "ref-2".into() });
}

#[tokio::test]
async fn revoked_refresh_is_unauthorized() {
    let auth = server().await;
    let err = auth.refresh("stale").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn logout_sends_user_and_refresh_token() {
    let auth = server().await;
    auth.logout("u1", "ref-1").await.unwrap();
    let err = auth.logout("u1", "other").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

// =============================================================================
// Validation (no request is sent)
// =============================================================================

#[tokio::test]
async fn login_requires_email_and_password() {
    let auth = AuthService::new(client_for(UNREACHABLE));
    for (email, password) in [("", "Secret123"), ("  ", "Secret123"), ("a@b.com", "")] {
        let err = auth.login(email, password).await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some(CODE_INVALID_REQUEST), "{email:?}/{password:?}");
    }
}

#[tokio::test]
async fn register_rejects_bad_email() {
    let auth = AuthService::new(client_for(UNREACHABLE));
    for email in ["", "plain", "@b.com", "a@"] {
        let err = auth.register(email, "Secret123").await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some(CODE_INVALID_REQUEST), "{email}");
    }
}

#[test]
fn password_rules() {
    assert!(validate_new_password("Secret123").is_ok());
    assert_eq!(validate_new_password("Sh0rt").unwrap_err().message, "Password must be at least 8 characters");
    assert_eq!(
        validate_new_password("secret123").unwrap_err().message,
        "Password must contain an uppercase letter"
    );
    assert_eq!(
        validate_new_password("SECRET123").unwrap_err().message,
        "Password must contain a lowercase letter"
    );
    assert_eq!(validate_new_password("SecretPass").unwrap_err().message, "Password must contain a number");
}

#[tokio::test]
async fn register_rejects_weak_password_without_request() {
    let auth = AuthService::new(client_for(UNREACHABLE));
    let err = auth.register("a@b.com", "password").await.unwrap_err();
    assert_eq!(err.code.as_deref(), Some(CODE_INVALID_REQUEST));
}
