//! Order placement and status workflows.
//!
//! Both workflows own a single transaction. Placement validates the whole
//! submission before touching the database, then inside one transaction:
//! re-prices every line from the catalog, inserts the order and its items,
//! takes stock with a conditional decrement and clears the server-side cart.
//! Any failure drops the transaction, so no partial order or orphaned stock
//! change is ever committed.

mod error;

pub use error::OrderError;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use chirag_core::checkout::{price_lines, validate_submission};
use chirag_core::{
    CheckoutLine, Money, OrderId, OrderNumber, OrderStatus, ProductId, ShippingAddress, UserId,
};

use crate::config::OrderConfig;
use crate::db::orders::{self, InsertOrderError, NewOrder};
use crate::db::{cart, products};
use crate::models::AdminOrderDetail;

/// How many order numbers are tried before giving up.
pub const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 3;

/// Longest accepted idempotency key.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 64;

/// A checkout submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<CheckoutLine>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    /// Client-computed total. Compared and logged, never stored.
    #[serde(default)]
    pub total: Option<Money>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Result of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub total: Money,
    /// The idempotency key matched an order placed earlier.
    #[serde(skip)]
    pub already_existed: bool,
}

enum Attempt {
    Placed(PlacedOrder),
    OrderNumberTaken,
    DuplicateSubmit,
}

/// Order workflows.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    config: OrderConfig,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, config: OrderConfig) -> Self {
        Self { pool, config }
    }

    /// Place an order for `user_id`.
    ///
    /// # Errors
    ///
    /// - `OrderError::Checkout` for an empty cart, a bad quantity, an
    ///   incomplete address, an unknown product or a total too large to store
    /// - `OrderError::OutOfStock` when a line cannot be covered
    /// - `OrderError::Repository` for storage failures
    ///
    /// Nothing is written on any error.
    #[instrument(skip(self, request), fields(user_id = %user_id, lines = request.items.len()))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: &PlaceOrderRequest,
    ) -> Result<PlacedOrder, OrderError> {
        validate_submission(&request.items, request.shipping_address.as_ref())?;
        let key = normalize_idempotency_key(request.idempotency_key.as_deref())?;

        if let Some(key) = key
            && let Some(existing) = self.find_existing(user_id, key).await?
        {
            return Ok(existing);
        }

        let address = request
            .shipping_address
            .clone()
            .map(ShippingAddress::normalized)
            .ok_or(chirag_core::CheckoutError::IncompleteAddress)?;

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            match self.try_place(user_id, request, &address, key).await? {
                Attempt::Placed(placed) => return Ok(placed),
                Attempt::OrderNumberTaken => {
                    tracing::warn!(attempt, "Order number collision, retrying");
                }
                Attempt::DuplicateSubmit => {
                    // A concurrent submit with the same key committed first.
                    if let Some(key) = key
                        && let Some(existing) = self.find_existing(user_id, key).await?
                    {
                        return Ok(existing);
                    }
                    return Err(OrderError::NotFound);
                }
            }
        }

        Err(OrderError::OrderNumberExhausted)
    }

    async fn try_place(
        &self,
        user_id: UserId,
        request: &PlaceOrderRequest,
        address: &ShippingAddress,
        idempotency_key: Option<&str>,
    ) -> Result<Attempt, OrderError> {
        let mut tx = self.pool.begin().await?;

        let ids: Vec<ProductId> = request.items.iter().map(|l| l.product_id).collect();
        let catalog = products::fetch_catalog_entries(&mut *tx, &ids).await?;
        let priced = price_lines(&request.items, &catalog)?;

        if !priced.matches_client_total(request.total) {
            tracing::warn!(
                client_total = ?request.total,
                server_total = %priced.total,
                "Client total differs from catalog pricing"
            );
        }

        let order_number = OrderNumber::generate();
        let new_order = NewOrder {
            order_number: &order_number,
            user_id,
            status: OrderStatus::Confirmed,
            total: priced.total,
            shipping_address: address,
            notes: request.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()),
            idempotency_key,
        };

        let order = match orders::insert_order(&mut *tx, &new_order).await {
            Ok(order) => order,
            Err(InsertOrderError::DuplicateOrderNumber) => return Ok(Attempt::OrderNumberTaken),
            Err(InsertOrderError::DuplicateIdempotencyKey) => return Ok(Attempt::DuplicateSubmit),
            Err(InsertOrderError::Repository(e)) => return Err(e.into()),
        };

        for (position, line) in (1..).zip(&priced.lines) {
            orders::insert_item(&mut *tx, order.id, position, line).await?;

            if !products::decrement_stock(&mut *tx, line.product_id, line.quantity).await? {
                tracing::info!(
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    "Insufficient stock, rolling back order"
                );
                return Err(OrderError::OutOfStock {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                });
            }
        }

        let cleared = cart::clear_cart(&mut *tx, user_id).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total,
            cleared_cart_lines = cleared,
            "Order placed"
        );

        Ok(Attempt::Placed(PlacedOrder {
            order_id: order.id,
            order_number: order.order_number,
            total: order.total,
            already_existed: false,
        }))
    }

    async fn find_existing(
        &self,
        user_id: UserId,
        key: &str,
    ) -> Result<Option<PlacedOrder>, OrderError> {
        let mut conn = self.pool.acquire().await?;
        let existing = orders::find_by_idempotency_key(&mut *conn, user_id, key).await?;

        Ok(existing.map(|order| {
            tracing::info!(order_id = %order.id, "Repeated submission, returning existing order");
            PlacedOrder {
                order_id: order.id,
                order_number: order.order_number,
                total: order.total,
                already_existed: true,
            }
        }))
    }

    /// Move an order to `status`.
    ///
    /// With restocking enabled, entering `cancelled` returns each line's units
    /// to its product and leaving `cancelled` takes them again. Re-selecting
    /// the current status changes nothing.
    ///
    /// # Errors
    ///
    /// - `OrderError::InvalidStatus` for an unknown status string
    /// - `OrderError::NotFound` for an unknown order
    /// - `OrderError::Transition` when the strict policy rejects the change
    /// - `OrderError::OutOfStock` when re-opening a cancelled order cannot
    ///   take its stock back
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<AdminOrderDetail, OrderError> {
        let target: OrderStatus = status
            .parse()
            .map_err(|_| OrderError::InvalidStatus(status.to_owned()))?;

        let mut tx = self.pool.begin().await?;

        let current = orders::lock_status(&mut *tx, order_id).await?;
        self.config.status_policy.check(current, target)?;

        if current != target {
            if self.config.restock_on_cancel && current.holds_stock() != target.holds_stock() {
                let items = orders::items_for_order(&mut *tx, order_id).await?;

                for item in &items {
                    let Some(product_id) = item.product_id else {
                        continue;
                    };

                    if target.holds_stock() {
                        if !products::decrement_stock(&mut *tx, product_id, item.quantity).await? {
                            return Err(OrderError::OutOfStock {
                                product_id,
                                product_name: item.product_name.clone(),
                            });
                        }
                    } else if !products::restore_stock(&mut *tx, product_id, item.quantity).await?
                    {
                        tracing::warn!(%product_id, "Product vanished while restocking");
                    }
                }
            }

            orders::set_status(&mut *tx, order_id, target).await?;
        }

        let detail = orders::admin_detail(&mut *tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(from = %current, to = %target, "Order status updated");
        Ok(detail)
    }
}

/// Trim an optional idempotency key; blank counts as absent.
fn normalize_idempotency_key(key: Option<&str>) -> Result<Option<&str>, OrderError> {
    match key.map(str::trim) {
        None | Some("") => Ok(None),
        Some(k) if k.chars().count() > MAX_IDEMPOTENCY_KEY_LEN => {
            Err(OrderError::InvalidIdempotencyKey {
                max: MAX_IDEMPOTENCY_KEY_LEN,
            })
        }
        Some(k) => Ok(Some(k)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_key_normalization() {
        assert_eq!(normalize_idempotency_key(None).unwrap(), None);
        assert_eq!(normalize_idempotency_key(Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_idempotency_key(Some(" checkout-42 ")).unwrap(),
            Some("checkout-42")
        );

        let long = "k".repeat(MAX_IDEMPOTENCY_KEY_LEN + 1);
        assert!(matches!(
            normalize_idempotency_key(Some(&long)),
            Err(OrderError::InvalidIdempotencyKey { .. })
        ));
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let json = r#"{
            "items": [{
                "productId": "3f2b8c0e-5d4a-4c1e-9a0b-7e6f5d4c3b2a",
                "name": "Classic Gold Solitaire Ring",
                "image": "/images/product/1.jpg",
                "price": "15999.00",
                "quantity": 2
            }],
            "shippingAddress": {
                "fullName": "Priya Sharma",
                "addressLine1": "12 MG Road",
                "city": "Pune",
                "state": "Maharashtra",
                "postalCode": "411001",
                "phone": "9876543210"
            },
            "total": "31998.00",
            "idempotencyKey": "cart-7"
        }"#;

        let request: PlaceOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.idempotency_key.as_deref(), Some("cart-7"));
        assert_eq!(
            request.shipping_address.unwrap().country,
            chirag_core::address::DEFAULT_COUNTRY
        );
    }

    #[test]
    fn test_empty_body_fails_validation_as_empty_cart() {
        let request: PlaceOrderRequest = serde_json::from_str("{}").unwrap();
        let err = validate_submission(&request.items, request.shipping_address.as_ref())
            .unwrap_err();
        assert_eq!(err.to_string(), "Cart is empty");
    }
}
