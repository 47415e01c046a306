//! Personal notes kept by signed-in users.

use chrono::{DateTime, Utc};
use serde::Serialize;

use emporium_core::{AuthUserId, NoteId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Note {
    pub id: NoteId,
    pub user_id: AuthUserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
