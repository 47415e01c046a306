//! Notes repository.

use sqlx::PgPool;

use emporium_core::AuthUserId;

use super::RepositoryError;
use crate::models::Note;

/// Repository for a user's personal notes.
pub struct NoteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NoteRepository<'a> {
    /// Create a new note repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Notes owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: AuthUserId) -> Result<Vec<Note>, RepositoryError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT id, user_id, title, created_at FROM notes \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(notes)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user_id: AuthUserId, title: &str) -> Result<Note, RepositoryError> {
        let note = sqlx::query_as::<_, Note>(
            "INSERT INTO notes (user_id, title) VALUES ($1, $2) \
             RETURNING id, user_id, title, created_at",
        )
        .bind(user_id)
        .bind(title)
        .fetch_one(self.pool)
        .await?;

        Ok(note)
    }
}
