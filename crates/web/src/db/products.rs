//! Product repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use emporium_core::{CategoryId, ProductId};

use super::{RepositoryError, contains_pattern};
use crate::models::Product;

const COLUMNS: &str = "id, title, slug, description, image_url, external_url, category_id, \
                       price, discount_price, stock, created_at, updated_at";

/// Editable fields of a product.
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Newest products first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_latest(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// All products, optionally filtered by a case-insensitive title search.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let pattern = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(contains_pattern);

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products \
             WHERE ($1::text IS NULL OR title ILIKE $1) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE category_id = $1 ORDER BY title"
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Products with the given ids that still exist, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, fields: &ProductFields) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products \
               (title, slug, description, image_url, external_url, category_id, \
                price, discount_price, stock) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .bind(&fields.external_url)
        .bind(fields.category_id)
        .bind(fields.price)
        .bind(fields.discount_price)
        .bind(fields.stock)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "slug already exists"))
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn update(
        &self,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET \
               title = $2, slug = $3, description = $4, image_url = $5, external_url = $6, \
               category_id = $7, price = $8, discount_price = $9, stock = $10, \
               updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .bind(&fields.external_url)
        .bind(fields.category_id)
        .bind(fields.price)
        .bind(fields.discount_price)
        .bind(fields.stock)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "slug already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Order items keep their snapshot with no product link.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
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

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
