//! Admin allow-list commands.
//!
//! The allow-list is how the first admin gets in: there is no one yet to add
//! them from the back-office.

use emporium_core::{Email, EmailError};
use emporium_web::db::{AdminUserRepository, RepositoryError};

use super::{CommandError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Email already on the allow-list.
    #[error("{0} is already an admin")]
    AlreadyAdmin(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Add an email to the allow-list.
pub async fn add(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    match AdminUserRepository::new(&pool).add(&email).await {
        Ok(admin) => {
            tracing::info!(id = %admin.id, email = %admin.email, "Admin added");
            Ok(())
        }
        Err(RepositoryError::Conflict(_)) => Err(AdminError::AlreadyAdmin(email.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Remove an email from the allow-list.
pub async fn remove(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    AdminUserRepository::new(&pool)
        .remove_by_email(&email)
        .await?;

    tracing::info!(email = %email, "Admin removed");
    Ok(())
}

/// Log every allow-listed email.
pub async fn list() -> Result<(), AdminError> {
    let pool = connect().await?;
    let admins = AdminUserRepository::new(&pool).list_all().await?;

    if admins.is_empty() {
        tracing::info!("No admins. Add one with `emporium-cli admin add <email>`");
    }
    for admin in admins {
        tracing::info!(
            "{:>4}  {}  (since {})",
            admin.id,
            admin.email,
            admin.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
