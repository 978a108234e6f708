//! Admin back-office route handlers.
//!
//! Every handler takes [`RequireAdmin`]: no session is 401, a user whose
//! stored role is not admin is 403.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use chirag_core::{CategoryId, Money, OrderId, OrderStatus, ProductId, Slug};

use crate::db::categories::CategoryRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::{NewProduct, ProductRepository};
use crate::error::{AppError, Result, order_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::RequireAdmin;
use crate::models::{AdminOrderDetail, AdminOrderSummary, Category, Product};
use crate::state::AppState;

/// Stock given to a new product when none is supplied.
pub const DEFAULT_NEW_PRODUCT_STOCK: i32 = 50;

/// `?id=` query for deletes.
#[derive(Debug, Deserialize)]
pub struct IdQuery<T> {
    pub id: Option<T>,
}

fn required_id<T>(query: IdQuery<T>, what: &str) -> Result<T> {
    query
        .id
        .ok_or_else(|| AppError::BadRequest(format!("{what} ID required")))
}

fn slug_for(name: &str) -> Result<Slug> {
    Slug::from_name(name).map_err(|e| AppError::BadRequest(e.to_string()))
}

// =============================================================================
// Categories
// =============================================================================

/// Category create body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Image URL.
    #[serde(default, alias = "imageUrl")]
    pub image: Option<String>,
}

/// Category rename body.
#[derive(Debug, Deserialize)]
pub struct RenameCategoryRequest {
    pub id: CategoryId,
    pub name: String,
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(body): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_owned()));
    }
    let slug = slug_for(name)?;

    let category = CategoryRepository::new(state.pool())
        .create(
            name,
            &slug,
            body.description.as_deref(),
            body.image.as_deref(),
        )
        .await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/admin/categories
pub async fn rename_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(body): ApiJson<RenameCategoryRequest>,
) -> Result<Json<Category>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_owned()));
    }
    let slug = slug_for(name)?;

    let category = CategoryRepository::new(state.pool())
        .rename(body.id, name, &slug)
        .await?;
    Ok(Json(category))
}

/// DELETE /api/admin/categories?id=
///
/// Refused with 409 while any product still belongs to the category.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<IdQuery<CategoryId>>,
) -> Result<StatusCode> {
    let id = required_id(query, "Category")?;
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Products
// =============================================================================

/// Product create/update body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub compare_at_price: Option<Money>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl ProductRequest {
    /// Check required fields and build the row values.
    ///
    /// `fallback_stock` fills in a missing `stock`.
    fn into_new_product(self, fallback_stock: i32) -> Result<NewProduct> {
        let name = self.name.trim().to_owned();
        let (Some(price), Some(category_id)) = (self.price, self.category_id) else {
            return Err(AppError::BadRequest(
                "Name, price, and category are required".to_owned(),
            ));
        };
        if name.is_empty() || price.is_zero() {
            return Err(AppError::BadRequest(
                "Name, price, and category are required".to_owned(),
            ));
        }

        let stock = self.stock.unwrap_or(fallback_stock);
        if stock < 0 {
            return Err(AppError::BadRequest("Stock cannot be negative".to_owned()));
        }

        Ok(NewProduct {
            slug: slug_for(&name)?,
            name,
            description: non_blank(self.description),
            price,
            compare_at_price: self.compare_at_price,
            images: self.images,
            category_id,
            stock,
            is_featured: self.is_featured,
            is_active: self.is_active,
            material: non_blank(self.material),
            weight: non_blank(self.weight),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(body): ApiJson<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = body.into_new_product(DEFAULT_NEW_PRODUCT_STOCK)?;
    let created = ProductRepository::new(state.pool()).create(&product).await?;

    tracing::info!(product_id = %created.id, slug = %created.slug, "Product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/admin/products/{id}
///
/// Replaces the product. A missing `stock` keeps the current stock.
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    ApiJson(body): ApiJson<ProductRequest>,
) -> Result<Json<Product>> {
    let repo = ProductRepository::new(state.pool());
    let existing = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let product = body.into_new_product(existing.stock)?;
    let updated = repo.update(id, &product).await?;
    Ok(Json(updated))
}

/// DELETE /api/admin/products?id=
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<IdQuery<ProductId>>,
) -> Result<StatusCode> {
    let id = required_id(query, "Product")?;
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

/// `?status=` filter for the order list.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
}

/// Status change body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_id: OrderId,
    pub status: String,
}

/// GET /api/admin/orders?status=
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<AdminOrderSummary>>> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("" | "all") => None,
        Some(s) => Some(
            s.parse::<OrderStatus>()
                .map_err(|_| AppError::BadRequest(format!("Invalid status: {s}")))?,
        ),
    };

    let orders = OrderRepository::new(state.pool()).list_all(status).await?;
    Ok(Json(orders))
}

/// GET /api/admin/orders/{id}
pub async fn show_order(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<AdminOrderDetail>> {
    let order = OrderRepository::new(state.pool()).get_any(id).await?;
    Ok(Json(order))
}

/// PATCH /api/admin/orders
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<AdminOrderDetail>> {
    let service = state.orders();
    let order = service.update_status(body.order_id, &body.status).await?;
    order_breadcrumb(
        &format!("Status set to {}", order.summary.order.status),
        &order.summary.order.order_number,
    );

    tracing::info!(
        admin_id = %admin.id,
        order_id = %body.order_id,
        status = %order.summary.order.status,
        "Admin changed order status"
    );
    Ok(Json(order))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: &str) -> ProductRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_product_defaults() {
        let category = CategoryId::generate();
        let product = request(&format!(
            r#"{{"name": "Pearl Drop Earrings", "price": "4999", "categoryId": "{category}"}}"#
        ))
        .into_new_product(DEFAULT_NEW_PRODUCT_STOCK)
        .unwrap();

        assert_eq!(product.slug.as_str(), "pearl-drop-earrings");
        assert_eq!(product.stock, DEFAULT_NEW_PRODUCT_STOCK);
        assert!(product.is_active);
        assert!(!product.is_featured);
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_explicit_zero_stock_is_kept() {
        let category = CategoryId::generate();
        let product = request(&format!(
            r#"{{"name": "Ring", "price": "100", "categoryId": "{category}", "stock": 0}}"#
        ))
        .into_new_product(DEFAULT_NEW_PRODUCT_STOCK)
        .unwrap();
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_required_fields() {
        let err = request(r#"{"name": "Ring", "price": "100"}"#)
            .into_new_product(DEFAULT_NEW_PRODUCT_STOCK)
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let category = CategoryId::generate();
        let err = request(&format!(r#"{{"name": "  ", "price": "100", "categoryId": "{category}"}}"#))
            .into_new_product(DEFAULT_NEW_PRODUCT_STOCK)
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_negative_stock_rejected() {
        let category = CategoryId::generate();
        let err = request(&format!(
            r#"{{"name": "Ring", "price": "100", "categoryId": "{category}", "stock": -1}}"#
        ))
        .into_new_product(DEFAULT_NEW_PRODUCT_STOCK)
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
