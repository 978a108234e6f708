//! Server-side cart route handlers.
//!
//! The browser keeps its own cart; these lines are the per-user remnant that
//! order placement clears. Quantities are clamped to stock on write but
//! nothing here reserves inventory.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use chirag_core::ProductId;

use crate::db::RepositoryError;
use crate::db::cart::{CartRepository, clear_cart};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::CartLine;
use crate::state::AppState;

/// Add-to-cart body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

/// Quantity update body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// The signed-in user's cart lines.
///
/// GET /api/cart
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<CartLine>>> {
    let lines = CartRepository::new(state.pool()).list(current.id).await?;
    Ok(Json(lines))
}

/// Add units of a product.
///
/// POST /api/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(body): ApiJson<AddItemRequest>,
) -> Result<Json<Vec<CartLine>>> {
    let cart = CartRepository::new(state.pool());
    cart.add(current.id, body.product_id, body.quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Product not found or out of stock".to_owned())
            }
            other => other.into(),
        })?;
    Ok(Json(cart.list(current.id).await?))
}

/// Change a line's quantity.
///
/// PATCH /api/cart/items/{product_id}
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(product_id): Path<ProductId>,
    ApiJson(body): ApiJson<UpdateItemRequest>,
) -> Result<Json<Vec<CartLine>>> {
    let cart = CartRepository::new(state.pool());
    cart.set_quantity(current.id, product_id, body.quantity).await?;
    Ok(Json(cart.list(current.id).await?))
}

/// Remove a line. Removing a missing line succeeds.
///
/// DELETE /api/cart/items/{product_id}
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<CartLine>>> {
    let cart = CartRepository::new(state.pool());
    cart.remove(current.id, product_id).await?;
    Ok(Json(cart.list(current.id).await?))
}

/// Empty the cart. Clearing an empty cart succeeds.
///
/// DELETE /api/cart
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<StatusCode> {
    let mut conn = state
        .pool()
        .acquire()
        .await
        .map_err(RepositoryError::from)?;
    clear_cart(&mut *conn, current.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
