//! Category repository.

use sqlx::PgPool;

use emporium_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

const COLUMNS: &str = "id, title, slug, description, image_url, created_at";

/// Editable fields of a category.
#[derive(Debug, Clone)]
pub struct CategoryFields {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories ORDER BY title"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, fields: &CategoryFields) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (title, slug, description, image_url) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "slug already exists"))
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        fields: &CategoryFields,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET title = $2, slug = $3, description = $4, image_url = $5 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "slug already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category. Products in it become uncategorised.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
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
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
