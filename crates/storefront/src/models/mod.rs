//! Domain models for storefront.
//!
//! Row types double as API response bodies: they derive `sqlx::FromRow` for
//! reads and `Serialize` (camelCase) for JSON responses.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod session;
pub mod user;

pub use address::Address;
pub use cart::CartLine;
pub use catalog::{Category, Product, ProductWithCategory};
pub use order::{AdminOrderDetail, AdminOrderSummary, Order, OrderDetail, OrderItem};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
