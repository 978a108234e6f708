//! Orders and order line items.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;

use chirag_core::{
    Email, Money, OrderId, OrderItemId, OrderNumber, OrderStatus, ProductId, ShippingAddress,
    UserId,
};

/// An order header.
///
/// `total` is fixed at placement time and never recomputed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Money,
    /// Snapshot of the address at placement time.
    pub shipping_address: Json<ShippingAddress>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchased line, snapshotted at placement time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub product_image: Option<String>,
    /// Unit price paid.
    pub price: Money,
    pub quantity: i32,
}

/// An order with its line items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// An order row in the admin listing, with the owner's identity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub customer_email: Email,
}

/// Full admin view of one order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderDetail {
    #[serde(flatten)]
    pub summary: AdminOrderSummary,
    pub items: Vec<OrderItem>,
}
