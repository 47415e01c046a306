//! Admin allow-list repository.
//!
//! The access gate asks [`AllowList`] on every `/admin` request. Emails are
//! stored as entered and compared lower-cased.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use emporium_core::{AdminUserId, Email};

use super::RepositoryError;
use crate::middleware::gate::AdminCheck;
use crate::models::AdminUser;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` admin user queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: AdminUserId,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// The allow-list table as the access gate sees it.
#[derive(Clone)]
pub struct AllowList {
    pool: PgPool,
}

impl AllowList {
    /// Check admin emails against the `admin_users` table.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminCheck for AllowList {
    async fn is_admin(&self, email: &Email) -> Result<bool, RepositoryError> {
        AdminUserRepository::new(&self.pool).is_admin(email).await
    }
}

/// Repository for the admin allow-list.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether `email` is on the allow-list (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_admin(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM admin_users WHERE lower(email) = $1)",
        )
        .bind(email.normalized())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// List all allow-list entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(
            "SELECT id, email, created_at FROM admin_users ORDER BY created_at, id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            "SELECT id, email, created_at FROM admin_users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Add an email to the allow-list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already listed.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(&self, email: &Email) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            "INSERT INTO admin_users (email) VALUES ($1) RETURNING id, email, created_at",
        )
        .bind(email.normalized())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "email already exists"))?;

        row.try_into()
    }

    /// Remove an entry by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no entry has that id.
    pub async fn remove(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove an entry by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the email is not listed.
    pub async fn remove_by_email(&self, email: &Email) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin_users WHERE lower(email) = $1")
            .bind(email.normalized())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
