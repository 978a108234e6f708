//! Chirag Core - Shared domain types and checkout rules.
//!
//! This crate provides the types used across all Chirag components:
//! - `storefront` - JSON API for the catalog, accounts, cart and orders
//! - `cli` - Command-line tools for migrations, seeding and admin users
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no database access,
//! no HTTP. Anything that must hold regardless of storage (order totals,
//! cart clamping, status transitions, address completeness) lives here so it
//! can be unit tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, money, slugs, order numbers
//!   and statuses
//! - [`address`] - Shipping address snapshot and its validation rules
//! - [`cart`] - The client-side cart model (advisory stock clamping)
//! - [`checkout`] - Validation and server-side pricing of a checkout submission

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod checkout;
pub mod types;

pub use address::{AddressError, ShippingAddress};
pub use cart::{Cart, CartItem};
pub use checkout::{CatalogEntry, CheckoutError, CheckoutLine, PricedLine, PricedOrder};
pub use types::*;
