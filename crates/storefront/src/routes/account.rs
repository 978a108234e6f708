//! Account route handlers: profile name and address book.
//!
//! These routes require authentication. Addresses are always scoped to the
//! signed-in user; another user's address ID behaves like a missing one.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use chirag_core::{AddressId, ShippingAddress};

use crate::db::addresses::AddressRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{Address, CurrentUser};
use crate::state::AppState;

/// Profile update body.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

/// Profile update response.
#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub name: String,
}

/// Change the display name.
///
/// PUT /api/account
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>> {
    let user = state.auth().update_name(current.id, &body.name).await?;

    // Keep the session copy in step with the row
    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(Json(UpdateProfileResponse { name: user.name }))
}

/// Address create/update body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    /// Required for updates, ignored for creates.
    #[serde(default)]
    pub id: Option<AddressId>,
    #[serde(flatten)]
    pub address: ShippingAddress,
    #[serde(default)]
    pub is_default: bool,
}

/// `?id=` query for deletes.
#[derive(Debug, Deserialize)]
pub struct AddressIdQuery {
    pub id: Option<AddressId>,
}

/// Validate and tidy a submitted address.
fn checked_address(address: ShippingAddress) -> Result<ShippingAddress> {
    let address = address.normalized();
    address
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(address)
}

/// The signed-in user's addresses, default first.
///
/// GET /api/addresses
pub async fn list_addresses(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool()).list(current.id).await?;
    Ok(Json(addresses))
}

/// Add an address.
///
/// POST /api/addresses
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(body): ApiJson<AddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    let address = checked_address(body.address)?;
    let created = AddressRepository::new(state.pool())
        .create(current.id, &address, body.is_default)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an address.
///
/// PUT /api/addresses
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(body): ApiJson<AddressRequest>,
) -> Result<Json<Address>> {
    let id = body
        .id
        .ok_or_else(|| AppError::BadRequest("Address ID required".to_owned()))?;
    let address = checked_address(body.address)?;
    let updated = AddressRepository::new(state.pool())
        .update(current.id, id, &address, body.is_default)
        .await?;
    Ok(Json(updated))
}

/// Delete an address.
///
/// DELETE /api/addresses?id=
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<AddressIdQuery>,
) -> Result<StatusCode> {
    let id = query
        .id
        .ok_or_else(|| AppError::BadRequest("Address ID required".to_owned()))?;
    AddressRepository::new(state.pool())
        .delete(current.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
