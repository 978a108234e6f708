//! Signed-in router tests: session cookie, body extraction, handlers and
//! the database together.
//!
//! These tests require a `PostgreSQL` database named by `TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p chirag-integration-tests -- --include-ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chirag_core::{OrderId, OrderStatus, UserRole};
use chirag_integration_tests::{
    TEST_PASSWORD, create_category, create_customer, create_product, create_user, line,
    order_count, order_request, status_of, stock_of, test_config, test_pool,
};
use chirag_storefront::db::users::UserRepository;
use chirag_storefront::models::User;
use chirag_storefront::services::orders::OrderService;
use chirag_storefront::state::AppState;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

const CLIENT_IP: &str = "203.0.113.7";

fn app(pool: &PgPool) -> Router {
    chirag_storefront::app(AppState::new(test_config(), pool.clone()))
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-real-ip", CLIENT_IP)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sign in through the API and return the `name=value` cookie pair.
async fn sign_in(app: &Router, user: &User) -> String {
    let body = json!({ "email": user.email.as_str(), "password": TEST_PASSWORD });
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/api/auth/login", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets the session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_owned()
}

fn order_body(product_id: impl ToString, quantity: i64, address: Value) -> Value {
    json!({
        "items": [{ "productId": product_id.to_string(), "quantity": quantity }],
        "shippingAddress": address,
    })
}

fn address() -> Value {
    json!({
        "fullName": "Ananya Rao",
        "addressLine1": "12 MG Road",
        "city": "Pune",
        "state": "Maharashtra",
        "postalCode": "411001",
        "phone": "9876543210",
    })
}

// ============================================================================
// Order placement
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_signed_in_customer_places_order() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "1000", 5).await;

    let app = app(&pool);
    let cookie = sign_in(&app, &user).await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/orders",
            Some(&cookie),
            &order_body(product.id, 2, address()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Order placed successfully");
    assert!(body["orderNumber"].as_str().unwrap().starts_with("CJ-"));
    assert!(body["orderId"].is_string());
    assert_eq!(stock_of(&pool, product.id).await, 3);
    assert_eq!(order_count(&pool, &user).await, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_address_without_city_is_incomplete() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "1000", 5).await;

    let app = app(&pool);
    let cookie = sign_in(&app, &user).await;

    let mut partial = address();
    partial.as_object_mut().unwrap().remove("city");

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/orders",
            Some(&cookie),
            &order_body(product.id, 1, partial),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "A complete shipping address is required" })
    );
    assert_eq!(stock_of(&pool, product.id).await, 5);
    assert_eq!(order_count(&pool, &user).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_oversized_total_is_bad_request() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "15999", 3).await;

    let app = app(&pool);
    let cookie = sign_in(&app, &user).await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/orders",
            Some(&cookie),
            &order_body(product.id, 10_000, address()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Order total is too large");
    assert_eq!(stock_of(&pool, product.id).await, 3);
}

// ============================================================================
// Admin status updates
// ============================================================================

async fn placed_order(pool: &PgPool) -> OrderId {
    let customer = create_customer(pool).await;
    let category = create_category(pool).await;
    let product = create_product(pool, &category, "1000", 5).await;
    OrderService::new(pool, test_config().orders)
        .place_order(customer.id, &order_request(vec![line(&product, 1)]))
        .await
        .unwrap()
        .order_id
}

fn status_body(order_id: OrderId, status: &str) -> Value {
    json!({ "orderId": order_id.to_string(), "status": status })
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_customer_cannot_update_status() {
    let pool = test_pool().await;
    let order_id = placed_order(&pool).await;
    let customer = create_customer(&pool).await;

    let app = app(&pool);
    let cookie = sign_in(&app, &customer).await;

    let response = app
        .oneshot(request(
            Method::PATCH,
            "/api/admin/orders",
            Some(&cookie),
            &status_body(order_id, "shipped"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["error"], "Forbidden");
    assert_eq!(status_of(&pool, order_id).await, OrderStatus::Confirmed);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_admin_updates_status() {
    let pool = test_pool().await;
    let order_id = placed_order(&pool).await;
    let admin = create_user(&pool, UserRole::Admin).await;

    let app = app(&pool);
    let cookie = sign_in(&app, &admin).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            "/api/admin/orders",
            Some(&cookie),
            &status_body(order_id, "shipped"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_of(&pool, order_id).await, OrderStatus::Shipped);

    let response = app
        .oneshot(request(
            Method::PATCH,
            "/api/admin/orders",
            Some(&cookie),
            &json!({ "orderId": order_id.to_string() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Invalid request body");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_role_change_applies_to_open_session() {
    let pool = test_pool().await;
    let order_id = placed_order(&pool).await;
    let admin = create_user(&pool, UserRole::Admin).await;

    let app = app(&pool);
    let cookie = sign_in(&app, &admin).await;

    UserRepository::new(&pool)
        .set_role(&admin.email, UserRole::Customer)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            "/api/admin/orders",
            Some(&cookie),
            &status_body(order_id, "shipped"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(status_of(&pool, order_id).await, OrderStatus::Confirmed);

    UserRepository::new(&pool)
        .set_role(&admin.email, UserRole::Admin)
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            Method::PATCH,
            "/api/admin/orders",
            Some(&cookie),
            &status_body(order_id, "shipped"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_of(&pool, order_id).await, OrderStatus::Shipped);
}
