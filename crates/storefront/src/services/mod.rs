//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration, password login and profile changes
//! - `orders` - Order placement, status changes and order queries

pub mod auth;
pub mod orders;
