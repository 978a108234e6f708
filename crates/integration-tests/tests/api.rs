//! Router-level tests that stop before the database.
//!
//! These run without `PostgreSQL`: the pool is lazy and every request here is
//! answered by an extractor, a layer or a health probe that never queries.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chirag_integration_tests::{lazy_pool, test_config};
use chirag_storefront::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

const CLIENT_IP: &str = "203.0.113.7";

fn app() -> Router {
    chirag_storefront::app(AppState::new(test_config(), lazy_pool()))
}

fn request(method: Method, uri: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-real-ip", CLIENT_IP);

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_owned()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn test_place_order_requires_session() {
    let body = r#"{"items": [], "shippingAddress": null}"#;
    let response = app()
        .oneshot(request(Method::POST, "/api/orders", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Unauthorized");
}

#[tokio::test]
async fn test_my_orders_require_session() {
    let response = app()
        .oneshot(request(Method::GET, "/api/orders", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_status_update_requires_session() {
    let body = r#"{"orderId": "3f2b8c0e-5d4a-4c1e-9a0b-7e6f5d4c3b2a", "status": "shipped"}"#;
    let response = app()
        .oneshot(request(Method::PATCH, "/api/admin/orders", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_malformed_email_is_rejected() {
    let body = r#"{"email": "not-an-email", "password": "whatever-123"}"#;
    let response = app()
        .oneshot(request(Method::POST, "/api/auth/login", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_body_missing_a_field_is_json_bad_request() {
    let body = r#"{"email": "ananya@example.com"}"#;
    let response = app()
        .oneshot(request(Method::POST, "/api/auth/login", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(json_body(response).await["error"], "Invalid request body");
}

#[tokio::test]
async fn test_truncated_body_is_json_bad_request() {
    let response = app()
        .oneshot(request(Method::POST, "/api/auth/register", Some("{\"name\":")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Malformed JSON");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app()
        .oneshot(request(Method::GET, "/api/does-not-exist", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
