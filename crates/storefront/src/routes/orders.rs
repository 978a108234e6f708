//! Customer order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use chirag_core::{OrderId, OrderNumber};

use crate::db::orders::OrderRepository;
use crate::error::{Result, order_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderDetail};
use crate::services::orders::PlaceOrderRequest;
use crate::state::AppState;

/// Placement response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub message: &'static str,
}

/// Place an order from a cart snapshot.
///
/// POST /api/orders
///
/// Returns 201 for a new order and 200 when an idempotency key matched an
/// earlier one.
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(body): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>)> {
    let service = state.orders();
    let placed = service.place_order(current.id, &body).await?;

    order_breadcrumb("Placed order", &placed.order_number);

    let status = if placed.already_existed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(PlaceOrderResponse {
            order_id: placed.order_id,
            order_number: placed.order_number,
            message: "Order placed successfully",
        }),
    ))
}

/// The signed-in user's orders, newest first.
///
/// GET /api/orders
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    Ok(Json(orders))
}

/// One of the signed-in user's orders with its items.
///
/// GET /api/orders/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = OrderRepository::new(state.pool())
        .get_for_user(current.id, id)
        .await?;
    Ok(Json(order))
}
