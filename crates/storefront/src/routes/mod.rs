//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (strict rate limit)
//! POST   /api/auth/register        - Create account and sign in
//! POST   /api/auth/login           - Sign in
//! POST   /api/auth/logout          - Sign out
//! GET    /api/auth/me              - Current user
//!
//! # Catalog (public)
//! GET    /api/categories           - All categories
//! GET    /api/products             - Filtered, paginated active products
//! GET    /api/products/{slug}      - One active product
//!
//! # Account (requires auth)
//! PUT    /api/account              - Change display name
//! GET    /api/addresses            - Address book
//! POST   /api/addresses            - Add address
//! PUT    /api/addresses            - Replace address (id in body)
//! DELETE /api/addresses?id=        - Delete address
//!
//! # Cart remnants (requires auth)
//! GET    /api/cart                 - Cart lines
//! POST   /api/cart/items           - Add units
//! PATCH  /api/cart/items/{id}      - Set quantity
//! DELETE /api/cart/items/{id}      - Remove line
//! DELETE /api/cart                 - Clear
//!
//! # Orders (requires auth)
//! POST   /api/orders               - Place order (checkout rate limit)
//! GET    /api/orders               - My orders
//! GET    /api/orders/{id}          - One of my orders
//!
//! # Admin (requires admin role)
//! POST/PUT/DELETE /api/admin/categories
//! POST            /api/admin/products
//! PUT             /api/admin/products/{id}
//! DELETE          /api/admin/products?id=
//! GET             /api/admin/orders[?status=]
//! GET             /api/admin/orders/{id}
//! PATCH           /api/admin/orders - Change status
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the public catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/products", get(catalog::products))
        .route("/products/{slug}", get(catalog::product))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account", put(account::update_profile))
        .route(
            "/addresses",
            get(account::list_addresses)
                .post(account::create_address)
                .put(account::update_address)
                .delete(account::delete_address),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{product_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the customer order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(orders::list).merge(post(orders::place).layer(checkout_rate_limiter())),
        )
        .route("/{id}", get(orders::show))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            post(admin::create_category)
                .put(admin::rename_category)
                .delete(admin::delete_category),
        )
        .route(
            "/products",
            post(admin::create_product).delete(admin::delete_product),
        )
        .route("/products/{id}", put(admin::update_product))
        .route(
            "/orders",
            get(admin::list_orders).patch(admin::update_order_status),
        )
        .route("/orders/{id}", get(admin::show_order))
}

/// Create all API routes.
///
/// Rate limiters key on the client IP, so the server must be started with
/// connect info (`into_make_service_with_connect_info::<SocketAddr>`) or sit
/// behind a proxy that sets a client IP header.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .merge(account_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/admin", admin_routes())
        .layer(api_rate_limiter());

    Router::new()
        .nest("/api/auth", auth_routes().layer(auth_rate_limiter()))
        .nest("/api", api)
}

