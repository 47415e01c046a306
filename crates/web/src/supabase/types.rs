//! Response types of the hosted auth and storage APIs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user record from the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

/// Tokens returned by a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Result of a sign-up.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Email confirmation is off; the user is signed in.
    SignedIn(AuthSession),
    /// The user must confirm their email before signing in.
    ConfirmationRequired(AuthUser),
}

/// Page of users from the admin listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserPage {
    #[serde(default)]
    pub users: Vec<AuthUser>,
}

/// An object in a storage bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageObject {
    pub name: String,
    /// `None` for folder placeholders.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<ObjectMetadata>,
}

impl StorageObject {
    /// Size in bytes, when the service reports it.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.metadata.as_ref().and_then(|m| m.size)
    }
}

/// Metadata the storage service keeps per object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mimetype: Option<String>,
}
