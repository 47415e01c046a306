//! Entries of the back-office allow-list.

use chrono::{DateTime, Utc};
use serde::Serialize;

use emporium_core::{AdminUserId, Email};

/// An email address allowed into `/admin`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}
