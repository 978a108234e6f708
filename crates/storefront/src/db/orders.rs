//! Order repository.
//!
//! Reads go through [`OrderRepository`]. The placement and status workflows
//! compose the free functions below inside a transaction they own.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use chirag_core::{Money, OrderId, OrderNumber, OrderStatus, PricedLine, ShippingAddress, UserId};

use super::{RepositoryError, is_unique_violation_on};
use crate::models::{AdminOrderDetail, AdminOrderSummary, Order, OrderDetail, OrderItem};

const ORDER_COLUMNS: &str = "o.id, o.order_number, o.user_id, o.status, o.total, \
                             o.shipping_address, o.notes, o.created_at, o.updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, product_image, price, quantity";

/// Unique constraint on `orders.order_number`.
pub const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

/// Unique index on `(orders.user_id, orders.idempotency_key)`.
pub const IDEMPOTENCY_KEY_CONSTRAINT: &str = "orders_user_idempotency_key_idx";

/// Repository for reading orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC, o.id
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// One order with its items, only if `user_id` owns it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the order is missing or owned
    /// by someone else; the two cases are indistinguishable.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: OrderId,
    ) -> Result<OrderDetail, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1 AND o.user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let mut conn = self.pool.acquire().await?;
        let items = items_for_order(&mut *conn, id).await?;

        Ok(OrderDetail { order, items })
    }

    /// Every order with its owner, newest first, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<AdminOrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderSummary>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.name AS customer_name, u.email AS customer_email
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE $1::order_status IS NULL OR o.status = $1
            ORDER BY o.created_at DESC, o.id
            "
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Any order with its owner and items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown ID.
    pub async fn get_any(&self, id: OrderId) -> Result<AdminOrderDetail, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        admin_detail(&mut *conn, id).await
    }
}

/// Full admin view of one order on an existing connection.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` for an unknown ID.
pub async fn admin_detail(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<AdminOrderDetail, RepositoryError> {
    let summary = sqlx::query_as::<_, AdminOrderSummary>(&format!(
        r"
        SELECT {ORDER_COLUMNS}, u.name AS customer_name, u.email AS customer_email
        FROM orders o
        JOIN users u ON u.id = o.user_id
        WHERE o.id = $1
        "
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    let items = items_for_order(conn, id).await?;

    Ok(AdminOrderDetail { summary, items })
}

/// Line items of an order in insertion order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn items_for_order(
    conn: &mut PgConnection,
    order_id: OrderId,
) -> Result<Vec<OrderItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY position"
    ))
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Look up an order previously placed with the same idempotency key.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_by_idempotency_key(
    conn: &mut PgConnection,
    user_id: UserId,
    key: &str,
) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.user_id = $1 AND o.idempotency_key = $2"
    ))
    .bind(user_id)
    .bind(key)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Fields of a new order header.
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub order_number: &'a OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Money,
    pub shipping_address: &'a ShippingAddress,
    pub notes: Option<&'a str>,
    pub idempotency_key: Option<&'a str>,
}

/// Why an order header could not be inserted.
#[derive(Debug)]
pub enum InsertOrderError {
    /// The generated order number is already taken.
    DuplicateOrderNumber,
    /// Another order already carries this idempotency key.
    DuplicateIdempotencyKey,
    Repository(RepositoryError),
}

impl From<sqlx::Error> for InsertOrderError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation_on(&e, ORDER_NUMBER_CONSTRAINT) {
            return Self::DuplicateOrderNumber;
        }
        if is_unique_violation_on(&e, IDEMPOTENCY_KEY_CONSTRAINT) {
            return Self::DuplicateIdempotencyKey;
        }
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Insert an order header.
///
/// # Errors
///
/// Distinguishes order-number and idempotency-key collisions from other
/// failures.
pub async fn insert_order(
    conn: &mut PgConnection,
    order: &NewOrder<'_>,
) -> Result<Order, InsertOrderError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        r"
        INSERT INTO orders AS o
            (order_number, user_id, status, total, shipping_address, notes, idempotency_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(order.order_number)
    .bind(order.user_id)
    .bind(order.status)
    .bind(order.total)
    .bind(Json(order.shipping_address))
    .bind(order.notes)
    .bind(order.idempotency_key)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

/// Insert one priced line of an order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    position: i32,
    line: &PricedLine,
) -> Result<OrderItem, RepositoryError> {
    let row = sqlx::query_as::<_, OrderItem>(&format!(
        r"
        INSERT INTO order_items
            (order_id, position, product_id, product_name, product_image, price, quantity)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {ITEM_COLUMNS}
        "
    ))
    .bind(order_id)
    .bind(position)
    .bind(line.product_id)
    .bind(&line.product_name)
    .bind(&line.product_image)
    .bind(line.unit_price)
    .bind(line.quantity)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

/// Read an order's status and lock the row until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` for an unknown ID.
pub async fn lock_status(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<OrderStatus, RepositoryError> {
    sqlx::query_scalar::<_, OrderStatus>("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Overwrite an order's status.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` for an unknown ID.
pub async fn set_status(
    conn: &mut PgConnection,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
