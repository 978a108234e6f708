//! Order workflow error types.

use thiserror::Error;

use chirag_core::{CheckoutError, ProductId, TransitionError};

use crate::db::RepositoryError;

/// Errors that can occur while placing an order or changing its status.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submission failed validation or pricing.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Not enough units on hand for a line.
    #[error("Insufficient stock for {product_name}")]
    OutOfStock {
        product_id: ProductId,
        product_name: String,
    },

    /// The requested status is not one of the known values.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// The idempotency key is blank or too long.
    #[error("Idempotency key must be between 1 and {max} characters")]
    InvalidIdempotencyKey { max: usize },

    /// The configured status policy rejected the change.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The order does not exist (or is not visible to the caller).
    #[error("Order not found")]
    NotFound,

    /// Every generated order number collided.
    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for OrderError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}
