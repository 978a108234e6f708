//! Integration tests for the Chirag storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Point at a disposable database; migrations run automatically
//! export TEST_DATABASE_URL=postgres://localhost/chirag_test
//!
//! # Database-backed tests are ignored by default
//! cargo test -p chirag-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `order_placement` - Checkout workflow against a real database
//! - `order_status` - Admin status changes and restocking
//! - `accounts` - Address book and cart invariants
//! - `api` - Router-level behaviour (no database needed)
//!
//! Fixtures use random names and emails so tests can share one database and
//! run concurrently.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::{IpAddr, Ipv4Addr};

use chirag_core::{
    CheckoutLine, Email, Money, OrderStatus, ProductId, ShippingAddress, Slug, UserRole,
};
use chirag_storefront::config::{LogFormat, OrderConfig, StorefrontConfig};
use chirag_storefront::db::categories::CategoryRepository;
use chirag_storefront::db::products::{NewProduct, ProductRepository};
use chirag_storefront::db::users::UserRepository;
use chirag_storefront::models::{Category, Product, User};
use chirag_storefront::services::auth::hash_password;
use chirag_storefront::services::orders::PlaceOrderRequest;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

/// Password given to every account made by [`create_user`].
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Env var naming the test database.
pub const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";

/// Connect to the test database and apply migrations.
pub async fn test_pool() -> PgPool {
    let url = std::env::var(TEST_DATABASE_URL).expect("TEST_DATABASE_URL must be set");
    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database");
    chirag_storefront::db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// A pool that never connects, for router tests that stop before the
/// database.
pub fn lazy_pool() -> PgPool {
    PgPool::connect_lazy("postgres://localhost/chirag_unused").expect("Invalid lazy pool URL")
}

/// Configuration suitable for in-process router tests.
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/chirag_unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        session_secret: SecretString::from(
            "kT9#vQ2!mZ7@pL4$wX8%nB3^hJ6&rC1*aF5(sD0)gH8_jK2+lM4=qW6~eR1<tY3>",
        ),
        orders: OrderConfig::default(),
        log_format: LogFormat::Text,
        sentry: None,
    }
}

/// Order settings with the strict transition policy.
pub fn strict_orders() -> OrderConfig {
    OrderConfig {
        status_policy: chirag_core::StatusPolicy::Strict,
        ..OrderConfig::default()
    }
}

fn unique(prefix: &str) -> String {
    format!("{prefix} {}", Uuid::new_v4().simple())
}

/// Create a customer with a random email.
pub async fn create_customer(pool: &PgPool) -> User {
    create_user(pool, UserRole::Customer).await
}

/// Create an account with the given role and a random email.
pub async fn create_user(pool: &PgPool, role: UserRole) -> User {
    let email = Email::parse(&format!("user-{}@example.com", Uuid::new_v4().simple()))
        .expect("valid email");
    let hash = hash_password(TEST_PASSWORD).expect("hash");
    UserRepository::new(pool)
        .create("Test Customer", &email, &hash, role)
        .await
        .expect("Failed to create user")
}

/// Create a category with a random name.
pub async fn create_category(pool: &PgPool) -> Category {
    let name = unique("Category");
    CategoryRepository::new(pool)
        .create(&name, &Slug::from_name(&name).expect("slug"), None, None)
        .await
        .expect("Failed to create category")
}

/// Create an active product with the given price and stock.
pub async fn create_product(pool: &PgPool, category: &Category, price: &str, stock: i32) -> Product {
    let name = unique("Product");
    ProductRepository::new(pool)
        .create(&NewProduct {
            slug: Slug::from_name(&name).expect("slug"),
            name,
            description: None,
            price: Money::parse(price).expect("price"),
            compare_at_price: None,
            images: vec!["/images/product/1.jpg".to_owned()],
            category_id: category.id,
            stock,
            is_featured: false,
            is_active: true,
            material: Some("Gold".to_owned()),
            weight: None,
        })
        .await
        .expect("Failed to create product")
}

/// Current stock of a product.
pub async fn stock_of(pool: &PgPool, product_id: ProductId) -> i32 {
    ProductRepository::new(pool)
        .get_by_id(product_id)
        .await
        .expect("query")
        .expect("product exists")
        .stock
}

/// Number of orders placed by a user.
pub async fn order_count(pool: &PgPool, user: &User) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(pool)
        .await
        .expect("count orders")
}

/// A complete shipping address.
pub fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Asha Mehta".to_owned(),
        address_line1: "12 MG Road".to_owned(),
        address_line2: None,
        city: "Pune".to_owned(),
        state: "Maharashtra".to_owned(),
        postal_code: "411001".to_owned(),
        country: "India".to_owned(),
        phone: "9876543210".to_owned(),
    }
}

/// A checkout line for `quantity` units of `product`.
pub fn line(product: &Product, quantity: i64) -> CheckoutLine {
    CheckoutLine {
        product_id: product.id,
        name: product.name.clone(),
        image: String::new(),
        price: Some(product.price),
        quantity,
    }
}

/// A submission with a complete address and no idempotency key.
pub fn order_request(items: Vec<CheckoutLine>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        items,
        shipping_address: Some(shipping_address()),
        total: None,
        notes: None,
        idempotency_key: None,
    }
}

/// Status of an order as stored.
pub async fn status_of(pool: &PgPool, order_id: chirag_core::OrderId) -> OrderStatus {
    sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_one(pool)
        .await
        .expect("order status")
}
