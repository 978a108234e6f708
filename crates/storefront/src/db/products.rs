//! Product repository and the stock contract.
//!
//! `products.stock` only changes through [`decrement_stock`] and
//! [`restore_stock`]. The decrement is conditional (`stock >= qty`) so it can
//! never drive stock negative, and it reports whether it applied so callers
//! can abort their transaction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use chirag_core::{CatalogEntry, CategoryId, Money, ProductId, Slug};

use super::RepositoryError;
use crate::models::{Product, ProductWithCategory};

/// Products per listing page.
pub const PAGE_SIZE: u32 = 12;

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.slug, p.description, p.price, p.compare_at_price, \
                               p.images, p.category_id, p.stock, p.is_featured, p.is_active, \
                               p.material, p.weight, p.created_at, p.updated_at";

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
    NameAsc,
}

impl ProductSort {
    const fn order_by(self) -> &'static str {
        match self {
            Self::PriceAsc => " ORDER BY p.price ASC, p.id",
            Self::PriceDesc => " ORDER BY p.price DESC, p.id",
            Self::Newest => " ORDER BY p.created_at DESC, p.id",
            Self::NameAsc => " ORDER BY p.name ASC, p.id",
        }
    }
}

/// Public catalog filters, read straight from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFilter {
    /// Category slug.
    pub category: Option<String>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub material: Option<String>,
    /// Only featured products when `true`.
    pub featured: Option<bool>,
    pub sort: ProductSort,
    /// 1-based page number.
    pub page: Option<u32>,
}

impl ProductFilter {
    /// The requested page, never below 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<ProductWithCategory>,
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
}

/// Fields for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    pub images: Vec<String>,
    pub category_id: CategoryId,
    pub stock: i32,
    pub is_featured: bool,
    pub is_active: bool,
    pub material: Option<String>,
    pub weight: Option<String>,
}

/// Repository for catalog product operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products matching `filter`, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<ProductPage, RepositoryError> {
        let page = filter.page();

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM products p JOIN categories c ON c.id = p.category_id",
        );
        push_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS}, c.name AS category_name, c.slug AS category_slug \
             FROM products p JOIN categories c ON c.id = p.category_id"
        ));
        push_filters(&mut select, filter);
        select.push(filter.sort.order_by());
        select.push(" LIMIT ");
        select.push_bind(i64::from(PAGE_SIZE));
        select.push(" OFFSET ");
        select.push_bind(i64::from(page - 1) * i64::from(PAGE_SIZE));

        let products = select
            .build_query_as::<ProductWithCategory>()
            .fetch_all(self.pool)
            .await?;

        Ok(ProductPage {
            products,
            total,
            page,
            total_pages: total_pages(total),
        })
    }

    /// Get an active product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductWithCategory>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductWithCategory>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name, c.slug AS category_slug
            FROM products p JOIN categories c ON c.id = p.category_id
            WHERE p.slug = $1 AND p.is_active
            "
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Get any product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate slug or an unknown
    /// category.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO products AS p
                (name, slug, description, price, compare_at_price, images, category_id,
                 stock, is_featured, is_active, material, weight)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(product.slug.as_str())
        .bind(&product.description)
        .bind(product.price)
        .bind(product.compare_at_price)
        .bind(Json(&product.images))
        .bind(product.category_id)
        .bind(product.stock)
        .bind(product.is_featured)
        .bind(product.is_active)
        .bind(&product.material)
        .bind(&product.weight)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_constraint(e, "product slug already exists or category is unknown")
        })
    }

    /// Replace every editable field of a product, including stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown ID and
    /// `RepositoryError::Conflict` for a duplicate slug or unknown category.
    pub async fn update(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE products AS p SET
                name = $2, slug = $3, description = $4, price = $5, compare_at_price = $6,
                images = $7, category_id = $8, stock = $9, is_featured = $10,
                is_active = $11, material = $12, weight = $13, updated_at = NOW()
            WHERE p.id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&product.name)
        .bind(product.slug.as_str())
        .bind(&product.description)
        .bind(product.price)
        .bind(product.compare_at_price)
        .bind(Json(&product.images))
        .bind(product.category_id)
        .bind(product.stock)
        .bind(product.is_featured)
        .bind(product.is_active)
        .bind(&product.material)
        .bind(&product.weight)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_constraint(e, "product slug already exists or category is unknown")
        })?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Past order lines keep their snapshot and lose the
    /// product reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown ID.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE p.is_active");

    if let Some(category) = non_blank(filter.category.as_deref()) {
        qb.push(" AND c.slug = ");
        qb.push_bind(category.to_owned());
    }
    if let Some(search) = non_blank(filter.search.as_deref()) {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (p.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND p.price >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND p.price <= ");
        qb.push_bind(max);
    }
    if let Some(material) = non_blank(filter.material.as_deref()) {
        qb.push(" AND p.material = ");
        qb.push_bind(material.to_owned());
    }
    if filter.featured == Some(true) {
        qb.push(" AND p.is_featured");
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn total_pages(total: i64) -> u32 {
    let pages = (total.max(0) + i64::from(PAGE_SIZE) - 1) / i64::from(PAGE_SIZE);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

// =============================================================================
// Stock contract (runs inside the caller's transaction)
// =============================================================================

/// Read authoritative pricing data for a set of products.
///
/// Unknown IDs are simply absent from the result.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn fetch_catalog_entries(
    conn: &mut PgConnection,
    ids: &[ProductId],
) -> Result<HashMap<ProductId, CatalogEntry>, RepositoryError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: ProductId,
        name: String,
        image: Option<String>,
        price: Money,
        is_active: bool,
    }

    let uuids: Vec<Uuid> = ids.iter().map(ProductId::as_uuid).collect();
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, name, images->>0 AS image, price, is_active FROM products WHERE id = ANY($1)",
    )
    .bind(uuids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            (
                r.id,
                CatalogEntry {
                    id: r.id,
                    name: r.name,
                    image: r.image,
                    price: r.price,
                    is_active: r.is_active,
                },
            )
        })
        .collect())
}

/// Take `quantity` units out of stock if at least that many are on hand.
///
/// Returns `false` (and changes nothing) when stock is insufficient or the
/// product no longer exists.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE products
        SET stock = stock - $2, updated_at = NOW()
        WHERE id = $1 AND stock >= $2
        ",
    )
    .bind(id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Put `quantity` units back into stock.
///
/// Returns `false` when the product no longer exists.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn restore_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("gold"), "gold");
        assert_eq!(escape_like("100%_pure\\"), "100\\%\\_pure\\\\");
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(12), 1);
        assert_eq!(total_pages(13), 2);
        assert_eq!(total_pages(32), 3);
    }

    #[test]
    fn test_filter_page_defaults_to_one() {
        let filter = ProductFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.sort, ProductSort::Newest);

        let filter = ProductFilter {
            page: Some(0),
            ..ProductFilter::default()
        };
        assert_eq!(filter.page(), 1);
    }

    #[test]
    fn test_sort_deserializes_snake_case() {
        let sort: ProductSort = serde_json::from_str("\"price_desc\"").unwrap_or_default();
        assert_eq!(sort, ProductSort::PriceDesc);
    }
}
