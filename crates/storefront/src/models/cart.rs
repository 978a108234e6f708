//! Server-side cart lines.

use serde::Serialize;

use chirag_core::{Money, ProductId};

/// A `cart_items` row joined with the live product data.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    /// Current catalog price, not the price when the line was added.
    pub price: Money,
    /// Primary product image.
    pub image: Option<String>,
    pub quantity: i32,
    /// Units on hand right now. Advisory only.
    pub stock: i32,
}
