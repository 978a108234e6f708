//! Checkout submission rules.
//!
//! A submission is validated in full before anything is written, then priced
//! from catalog data. Prices, names and totals sent by the client are display
//! hints only; [`price_lines`] rebuilds every line from [`CatalogEntry`]
//! values read inside the placement transaction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::ShippingAddress;
use crate::types::{Money, ProductId};

/// Errors raised while validating or pricing a checkout.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Quantity must be at least 1")]
    InvalidQuantity { product_id: ProductId },
    #[error("A complete shipping address is required")]
    IncompleteAddress,
    /// The product does not exist or is no longer on sale.
    #[error("Product not found")]
    UnknownProduct(ProductId),
    #[error("Order total is too large")]
    Overflow,
}

/// A line as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price: Option<Money>,
    pub quantity: i64,
}

/// Authoritative product data used to price a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub price: Money,
    pub is_active: bool,
}

/// A line priced from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_image: Option<String>,
    pub unit_price: Money,
    pub quantity: i32,
    pub line_total: Money,
}

/// The priced lines of an order, in submission order, and their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total: Money,
}

impl PricedOrder {
    /// Whether a client-supplied total agrees with the computed one.
    ///
    /// An absent client total counts as agreeing.
    #[must_use]
    pub fn matches_client_total(&self, client_total: Option<Money>) -> bool {
        client_total.is_none_or(|t| t == self.total)
    }
}

/// Check a submission before any state is touched.
///
/// # Errors
///
/// Returns the first failed precondition: empty cart, a quantity below one
/// (or beyond the storage range), then an incomplete shipping address.
pub fn validate_submission(
    lines: &[CheckoutLine],
    address: Option<&ShippingAddress>,
) -> Result<(), CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    if let Some(line) = lines
        .iter()
        .find(|l| l.quantity < 1 || i32::try_from(l.quantity).is_err())
    {
        return Err(CheckoutError::InvalidQuantity {
            product_id: line.product_id,
        });
    }

    match address {
        Some(a) if a.ensure_complete().is_ok() => Ok(()),
        _ => Err(CheckoutError::IncompleteAddress),
    }
}

/// Price each line from catalog data, keeping submission order.
///
/// Lines are expected to have passed [`validate_submission`].
///
/// # Errors
///
/// Returns `UnknownProduct` for a product missing from `catalog` or marked
/// inactive, `InvalidQuantity` for an out-of-range quantity and `Overflow` if
/// a line or the total exceeds [`Money::MAX`].
pub fn price_lines(
    lines: &[CheckoutLine],
    catalog: &HashMap<ProductId, CatalogEntry>,
) -> Result<PricedOrder, CheckoutError> {
    let mut priced = Vec::with_capacity(lines.len());
    let mut total = Money::ZERO;

    for line in lines {
        let entry = catalog
            .get(&line.product_id)
            .filter(|e| e.is_active)
            .ok_or(CheckoutError::UnknownProduct(line.product_id))?;

        let quantity = i32::try_from(line.quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or(CheckoutError::InvalidQuantity {
                product_id: line.product_id,
            })?;

        let line_total = entry
            .price
            .checked_mul(quantity.unsigned_abs())
            .filter(|t| *t <= Money::MAX)
            .ok_or(CheckoutError::Overflow)?;
        total = total
            .checked_add(line_total)
            .filter(|t| *t <= Money::MAX)
            .ok_or(CheckoutError::Overflow)?;

        priced.push(PricedLine {
            product_id: entry.id,
            product_name: entry.name.clone(),
            product_image: entry.image.clone(),
            unit_price: entry.price,
            quantity,
            line_total,
        });
    }

    Ok(PricedOrder {
        lines: priced,
        total,
    })
}
