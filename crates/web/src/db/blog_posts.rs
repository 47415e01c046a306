//! Blog post repository.

use sqlx::PgPool;

use emporium_core::BlogPostId;

use super::RepositoryError;
use crate::models::BlogPost;

const COLUMNS: &str = "id, title, slug, content, excerpt, image_url, published, published_at, \
                       created_at, updated_at";

/// Editable fields of a blog post.
#[derive(Debug, Clone)]
pub struct BlogPostFields {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub published: bool,
}

/// Repository for blog post database operations.
pub struct BlogPostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogPostRepository<'a> {
    /// Create a new blog post repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self, limit: Option<i64>) -> Result<Vec<BlogPost>, RepositoryError> {
        let posts = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {COLUMNS} FROM blog_posts WHERE published \
             ORDER BY published_at DESC NULLS LAST, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(posts)
    }

    /// A published post by slug. Drafts are not returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {COLUMNS} FROM blog_posts WHERE slug = $1 AND published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(post)
    }

    /// Every post including drafts, most recently edited first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let posts = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {COLUMNS} FROM blog_posts ORDER BY updated_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(posts)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BlogPostId) -> Result<Option<BlogPost>, RepositoryError> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(post)
    }

    /// Create a post, stamping `published_at` if it is published right away.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, fields: &BlogPostFields) -> Result<BlogPost, RepositoryError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "INSERT INTO blog_posts (title, slug, content, excerpt, image_url, published, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 THEN now() END) \
             RETURNING {COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.content)
        .bind(&fields.excerpt)
        .bind(&fields.image_url)
        .bind(fields.published)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "slug already exists"))
    }

    /// Update a post. `published_at` is set on the first publish only;
    /// unpublishing keeps the original date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn update(
        &self,
        id: BlogPostId,
        fields: &BlogPostFields,
    ) -> Result<BlogPost, RepositoryError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "UPDATE blog_posts SET \
               title = $2, slug = $3, content = $4, excerpt = $5, image_url = $6, \
               published = $7, \
               published_at = CASE WHEN $7 AND published_at IS NULL THEN now() ELSE published_at END, \
               updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.content)
        .bind(&fields.excerpt)
        .bind(&fields.image_url)
        .bind(fields.published)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "slug already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    pub async fn delete(&self, id: BlogPostId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
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
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
