//! Integration tests for order placement.
//!
//! These tests require a `PostgreSQL` database named by `TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p chirag-integration-tests -- --include-ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chirag_core::{CheckoutError, Money, ProductId};
use chirag_integration_tests::{
    create_category, create_customer, create_product, line, order_count, order_request,
    stock_of, test_config, test_pool,
};
use chirag_storefront::db::cart::CartRepository;
use chirag_storefront::db::orders::OrderRepository;
use chirag_storefront::services::orders::{OrderError, OrderService};

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_place_order_decrements_stock_and_clears_cart() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "1000", 10).await;

    CartRepository::new(&pool)
        .add(user.id, product.id, 2)
        .await
        .unwrap();

    let service = OrderService::new(&pool, test_config().orders);
    let placed = service
        .place_order(user.id, &order_request(vec![line(&product, 2)]))
        .await
        .unwrap();

    assert!(!placed.already_existed);
    assert!(placed.order_number.as_str().starts_with("CJ-"));
    assert_eq!(placed.total, Money::parse("2000").unwrap());
    assert_eq!(stock_of(&pool, product.id).await, 8);
    assert!(CartRepository::new(&pool).list(user.id).await.unwrap().is_empty());

    let detail = OrderRepository::new(&pool)
        .get_for_user(user.id, placed.order_id)
        .await
        .unwrap();
    assert_eq!(detail.order.total, placed.total);
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 2);
    assert_eq!(detail.items[0].product_name, product.name);
    assert_eq!(detail.order.shipping_address.0.city, "Pune");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_total_is_sum_of_line_snapshots() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let ring = create_product(&pool, &category, "15999", 5).await;
    let chain = create_product(&pool, &category, "3999.50", 5).await;

    let service = OrderService::new(&pool, test_config().orders);
    let placed = service
        .place_order(
            user.id,
            &order_request(vec![line(&ring, 1), line(&chain, 3)]),
        )
        .await
        .unwrap();

    let detail = OrderRepository::new(&pool)
        .get_for_user(user.id, placed.order_id)
        .await
        .unwrap();

    let sum = detail.items.iter().fold(Money::ZERO, |acc, item| {
        let quantity = u32::try_from(item.quantity).unwrap();
        acc.checked_add(item.price.checked_mul(quantity).unwrap())
            .unwrap()
    });
    assert_eq!(sum, detail.order.total);
    assert_eq!(placed.total, Money::parse("27997.50").unwrap());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_client_price_is_ignored() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "500", 3).await;

    let mut tampered = line(&product, 1);
    tampered.price = Some(Money::parse("1").unwrap());
    let mut request = order_request(vec![tampered]);
    request.total = Some(Money::parse("1").unwrap());

    let placed = OrderService::new(&pool, test_config().orders)
        .place_order(user.id, &request)
        .await
        .unwrap();

    assert_eq!(placed.total, Money::parse("500").unwrap());
}

// ============================================================================
// Rejections leave no trace
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_empty_cart_is_rejected() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;

    let err = OrderService::new(&pool, test_config().orders)
        .place_order(user.id, &order_request(vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::Checkout(CheckoutError::EmptyCart)));
    assert_eq!(err.to_string(), "Cart is empty");
    assert_eq!(order_count(&pool, &user).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_out_of_stock_rolls_back() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let in_stock = create_product(&pool, &category, "1000", 4).await;
    let sold_out = create_product(&pool, &category, "500", 0).await;

    CartRepository::new(&pool)
        .add(user.id, in_stock.id, 1)
        .await
        .unwrap();

    let err = OrderService::new(&pool, test_config().orders)
        .place_order(
            user.id,
            &order_request(vec![line(&in_stock, 2), line(&sold_out, 1)]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::OutOfStock { product_id, .. } if product_id == sold_out.id));
    assert_eq!(order_count(&pool, &user).await, 0);
    // The first line's decrement was rolled back with the order
    assert_eq!(stock_of(&pool, in_stock.id).await, 4);
    assert_eq!(stock_of(&pool, sold_out.id).await, 0);
    assert_eq!(CartRepository::new(&pool).list(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_unknown_product_is_rejected() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "1000", 4).await;

    let mut ghost = line(&product, 1);
    ghost.product_id = ProductId::generate();

    let err = OrderService::new(&pool, test_config().orders)
        .place_order(user.id, &order_request(vec![line(&product, 1), ghost]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::Checkout(CheckoutError::UnknownProduct(_))
    ));
    assert_eq!(stock_of(&pool, product.id).await, 4);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_total_beyond_column_width_is_rejected() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "15999", 3).await;

    let err = OrderService::new(&pool, test_config().orders)
        .place_order(user.id, &order_request(vec![line(&product, 10_000)]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::Checkout(CheckoutError::Overflow)));
    assert_eq!(order_count(&pool, &user).await, 0);
    assert_eq!(stock_of(&pool, product.id).await, 3);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_missing_address_is_rejected() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "1000", 4).await;

    let mut request = order_request(vec![line(&product, 1)]);
    request.shipping_address.as_mut().unwrap().city = "  ".to_owned();

    let err = OrderService::new(&pool, test_config().orders)
        .place_order(user.id, &request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::Checkout(CheckoutError::IncompleteAddress)
    ));
    assert_eq!(stock_of(&pool, product.id).await, 4);
}

// ============================================================================
// Concurrency and idempotency
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_concurrent_orders_for_last_unit() {
    let pool = test_pool().await;
    let alice = create_customer(&pool).await;
    let bob = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "2500", 1).await;

    let config = test_config().orders;
    let first = OrderService::new(&pool, config);
    let second = OrderService::new(&pool, config);
    let request = order_request(vec![line(&product, 1)]);

    let (a, b) = tokio::join!(
        first.place_order(alice.id, &request),
        second.place_order(bob.id, &request),
    );

    let results = [a, b];
    let placed = results.iter().filter(|r| r.is_ok()).count();
    let sold_out = results
        .iter()
        .filter(|r| matches!(r, Err(OrderError::OutOfStock { .. })))
        .count();

    assert_eq!(placed, 1);
    assert_eq!(sold_out, 1);
    assert_eq!(stock_of(&pool, product.id).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_idempotency_key_returns_existing_order() {
    let pool = test_pool().await;
    let user = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "1000", 10).await;

    let mut request = order_request(vec![line(&product, 1)]);
    request.idempotency_key = Some("checkout-7f3a".to_owned());

    let service = OrderService::new(&pool, test_config().orders);
    let first = service.place_order(user.id, &request).await.unwrap();
    let again = service.place_order(user.id, &request).await.unwrap();

    assert!(!first.already_existed);
    assert!(again.already_existed);
    assert_eq!(first.order_id, again.order_id);
    assert_eq!(first.order_number, again.order_number);
    assert_eq!(order_count(&pool, &user).await, 1);
    assert_eq!(stock_of(&pool, product.id).await, 9);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_idempotency_key_is_per_user() {
    let pool = test_pool().await;
    let alice = create_customer(&pool).await;
    let bob = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "1000", 10).await;

    let mut request = order_request(vec![line(&product, 1)]);
    request.idempotency_key = Some("same-key".to_owned());

    let service = OrderService::new(&pool, test_config().orders);
    let a = service.place_order(alice.id, &request).await.unwrap();
    let b = service.place_order(bob.id, &request).await.unwrap();

    assert_ne!(a.order_id, b.order_id);
    assert_eq!(stock_of(&pool, product.id).await, 8);
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_foreign_order_is_not_found() {
    let pool = test_pool().await;
    let owner = create_customer(&pool).await;
    let stranger = create_customer(&pool).await;
    let category = create_category(&pool).await;
    let product = create_product(&pool, &category, "1000", 10).await;

    let placed = OrderService::new(&pool, test_config().orders)
        .place_order(owner.id, &order_request(vec![line(&product, 1)]))
        .await
        .unwrap();

    let orders = OrderRepository::new(&pool);
    assert!(orders.get_for_user(owner.id, placed.order_id).await.is_ok());
    assert!(matches!(
        orders.get_for_user(stranger.id, placed.order_id).await,
        Err(chirag_storefront::db::RepositoryError::NotFound)
    ));
    assert!(orders.list_for_user(stranger.id).await.unwrap().is_empty());
}
