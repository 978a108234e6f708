//! Catalog types: categories and products.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;

use chirag_core::{CatalogEntry, CategoryId, Money, ProductId};

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A product as stored in the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    /// Ordered image URLs; the first one is the primary image.
    pub images: Json<Vec<String>>,
    pub category_id: CategoryId,
    /// Units on hand. Never negative.
    pub stock: i32,
    pub is_featured: bool,
    pub is_active: bool,
    pub material: Option<String>,
    pub weight: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The primary image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.0.first().map(String::as_str)
    }

    /// Authoritative pricing data for checkout.
    #[must_use]
    pub fn catalog_entry(&self) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            name: self.name.clone(),
            image: self.primary_image().map(str::to_owned),
            price: self.price,
            is_active: self.is_active,
        }
    }
}

/// A product joined with its category's name and slug.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub category_name: String,
    pub category_slug: String,
}
