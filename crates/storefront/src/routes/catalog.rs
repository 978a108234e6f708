//! Public catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::db::categories::CategoryRepository;
use crate::db::products::{ProductFilter, ProductPage, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::{Category, ProductWithCategory};
use crate::state::AppState;

/// All categories, by name.
///
/// GET /api/categories
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// One page of active products.
///
/// GET /api/products?category=&search=&minPrice=&maxPrice=&material=&featured=&sort=&page=
pub async fn products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<ProductPage>> {
    let page = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(page))
}

/// An active product by slug.
///
/// GET /api/products/{slug}
pub async fn product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductWithCategory>> {
    ProductRepository::new(state.pool())
        .get_active_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}
