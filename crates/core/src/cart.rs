//! The shopper's cart as held by the client.
//!
//! Stock numbers here are a snapshot taken when the item was added. They only
//! cap quantities in the UI; the order placement transaction is the sole
//! authority on availability.

use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutLine;
use crate::types::{Money, ProductId};

/// Storage key used by browser clients to persist the cart.
pub const CART_STORAGE_KEY: &str = "chirag-cart";

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
    pub stock: u32,
    pub slug: String,
}

impl CartItem {
    /// Unit price times quantity, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul(self.quantity)
    }
}

/// An ordered list of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a product, merging with an existing line for the same product.
    ///
    /// The merged quantity is capped at the stock snapshot carried by `item`.
    /// Nothing is added when the snapshot shows no stock.
    pub fn add_item(&mut self, item: CartItem) {
        if item.stock == 0 {
            return;
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            existing.stock = item.stock;
            existing.price = item.price;
            existing.quantity = existing
                .quantity
                .saturating_add(item.quantity.max(1))
                .min(item.stock);
            return;
        }

        let quantity = item.quantity.clamp(1, item.stock);
        self.items.push(CartItem { quantity, ..item });
    }

    /// Remove a product's line. Unknown products are ignored.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Set a line's quantity, clamped to `[1, stock]`.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity.min(item.stock).max(1);
        }
    }

    /// Empty the cart. Clearing an empty cart is a no-op.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Display total using the snapshot prices.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn total(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::ZERO, |acc, i| acc.checked_add(i.line_total()?))
    }

    /// Convert the cart into the line list submitted at checkout.
    #[must_use]
    pub fn to_checkout_lines(&self) -> Vec<CheckoutLine> {
        self.items
            .iter()
            .map(|i| CheckoutLine {
                product_id: i.product_id,
                name: i.name.clone(),
                image: i.image.clone(),
                price: Some(i.price),
                quantity: i64::from(i.quantity),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ring(stock: u32, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(uuid::Uuid::from_u128(1)),
            name: "Classic Gold Solitaire Ring".to_owned(),
            price: Money::parse("45999").unwrap(),
            image: "/images/ring.jpg".to_owned(),
            quantity,
            stock,
            slug: "classic-gold-solitaire-ring".to_owned(),
        }
    }

    fn chain() -> CartItem {
        CartItem {
            product_id: ProductId::new(uuid::Uuid::from_u128(2)),
            name: "Rope Chain".to_owned(),
            price: Money::parse("500").unwrap(),
            image: String::new(),
            quantity: 1,
            stock: 10,
            slug: "rope-chain".to_owned(),
        }
    }

    #[test]
    fn test_add_merges_and_clamps_to_stock() {
        let mut cart = Cart::new();
        cart.add_item(ring(3, 2));
        cart.add_item(ring(3, 2));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_add_out_of_stock_is_ignored() {
        let mut cart = Cart::new();
        cart.add_item(ring(0, 1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_clamps() {
        let mut cart = Cart::new();
        cart.add_item(ring(5, 1));
        let id = cart.items()[0].product_id;

        cart.update_quantity(id, 99);
        assert_eq!(cart.items()[0].quantity, 5);

        cart.update_quantity(id, 0);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add_item(ring(5, 2));
        cart.add_item(chain());
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total().unwrap(), Money::parse("92498.00").unwrap());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(ring(5, 1));
        cart.add_item(chain());
        cart.remove_item(ProductId::new(uuid::Uuid::from_u128(1)));
        assert_eq!(cart.items().len(), 1);

        cart.clear();
        assert!(cart.is_empty());
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_checkout_lines_keep_order() {
        let mut cart = Cart::new();
        cart.add_item(chain());
        cart.add_item(ring(5, 2));
        let lines = cart.to_checkout_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Rope Chain");
        assert_eq!(lines[1].quantity, 2);
    }

    #[test]
    fn test_checkout_lines_price_from_catalog() {
        use std::collections::HashMap;

        use crate::checkout::{CatalogEntry, price_lines};

        let mut cart = Cart::new();
        cart.add_item(ring(5, 2));
        let lines = cart.to_checkout_lines();
        assert_eq!(lines[0].quantity, 2_i64);
        assert_eq!(lines[0].price, Some(Money::parse("45999").unwrap()));

        let entry = CatalogEntry {
            id: lines[0].product_id,
            name: "Classic Gold Solitaire Ring".to_owned(),
            image: None,
            price: Money::parse("45999").unwrap(),
            is_active: true,
        };
        let catalog = HashMap::from([(entry.id, entry)]);
        let order = price_lines(&lines, &catalog).unwrap();
        assert_eq!(Some(order.total), cart.total());
    }

    #[test]
    fn test_serializes_as_array() {
        let mut cart = Cart::new();
        cart.add_item(chain());
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["productId"], "00000000-0000-0000-0000-000000000002");
    }
}
