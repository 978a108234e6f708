//! Server-side cart repository.
//!
//! Quantities are clamped to current stock when written. The clamp is
//! advisory: only order placement guarantees availability.

use sqlx::{PgConnection, PgPool};

use chirag_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::CartLine;

/// Repository for `cart_items`.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart lines joined with live product data, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLine>(
            r"
            SELECT ci.product_id, p.name, p.slug, p.price, p.images->>0 AS image,
                   ci.quantity, p.stock
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.created_at, ci.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Add units of an active, in-stock product, merging with an existing
    /// line. The resulting quantity is capped at current stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is unknown, inactive
    /// or out of stock.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            SELECT $1, p.id, LEAST(GREATEST($3, 1), p.stock)
            FROM products p
            WHERE p.id = $2 AND p.is_active AND p.stock > 0
            ON CONFLICT (user_id, product_id) DO UPDATE
            SET quantity = LEAST(
                cart_items.quantity + GREATEST($3, 1),
                (SELECT stock FROM products WHERE id = $2)
            )
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set a line's quantity, clamped to `[1, stock]`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart_items ci
            SET quantity = GREATEST(LEAST($3, p.stock), 1)
            FROM products p
            WHERE p.id = ci.product_id AND ci.user_id = $1 AND ci.product_id = $2
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove one product's line. Removing a missing line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

/// Delete every cart line of a user. Clearing an empty cart is a no-op.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn clear_cart(conn: &mut PgConnection, user_id: UserId) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
