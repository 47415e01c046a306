//! `PostgreSQL` side of slug uniqueness.

use sqlx::PgPool;

use emporium_core::{SlugStore, SlugTable};

use super::RepositoryError;

/// Answers slug collision checks for [`emporium_core::unique_slug`].
pub struct SlugRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SlugRepository<'a> {
    /// Create a new slug repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl SlugStore for SlugRepository<'_> {
    type Error = RepositoryError;

    async fn slug_exists(
        &self,
        table: SlugTable,
        slug: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, RepositoryError> {
        // Table names come from a closed enum, never from input
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE slug = $1 AND ($2::int4 IS NULL OR id <> $2))",
            table.table_name()
        );

        let exists: bool = sqlx::query_scalar(&sql)
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }
}
