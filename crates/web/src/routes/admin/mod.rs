//! Admin back-office route handlers.
//!
//! Every path here is behind the access gate, so handlers only see visitors
//! on the `admin_users` allow-list.
//!
//! # Route Structure
//!
//! ```text
//! GET  /admin                          - Dashboard
//!
//! # Products, categories, posts (same shape, multipart forms)
//! GET  /admin/products                 - List
//! POST /admin/products                 - Create
//! GET  /admin/products/new             - New form
//! GET  /admin/products/{id}/edit       - Edit form
//! POST /admin/products/{id}            - Update
//! POST /admin/products/{id}/delete     - Delete
//!
//! # Orders
//! GET  /admin/orders?status=           - List, optionally by status
//! GET  /admin/orders/{id}              - Detail with items
//! POST /admin/orders/{id}/status       - Update status and payment status
//!
//! # Media
//! GET  /admin/media?bucket=            - Objects in a bucket
//! POST /admin/media                    - Upload (multipart)
//! POST /admin/media/delete             - Remove an object
//!
//! # Allow-list
//! GET  /admin/users                    - Allow-list and registered users
//! POST /admin/users                    - Add an email
//! POST /admin/users/{id}/delete        - Remove an entry
//! ```

pub mod categories;
pub mod dashboard;
pub mod media;
pub mod orders;
pub mod posts;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use emporium_core::{Slug, SlugTable, UniqueSlugError, unique_slug};

use crate::db::{RepositoryError, SlugRepository};
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::uploads::{ADMIN_BODY_LIMIT, MultipartForm, UploadError};

/// Signed-in admin and active section, for the back-office layout.
#[derive(Debug, Clone)]
pub struct AdminLayout {
    pub email: String,
    pub current_path: &'static str,
}

impl AdminLayout {
    #[must_use]
    pub fn new(user: &CurrentUser, current_path: &'static str) -> Self {
        Self {
            email: user.email.to_string(),
            current_path,
        }
    }

    /// Whether a sidebar link is the active section.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        if path == "/admin" {
            self.current_path == "/admin"
        } else {
            self.current_path.starts_with(path)
        }
    }
}

/// Slug for a submitted form: the explicit `slug` field, else the title.
///
/// `exclude_id` is the row being edited so it keeps its own slug.
///
/// # Errors
///
/// Returns a message to show in the form.
pub(crate) async fn resolve_slug(
    state: &AppState,
    table: SlugTable,
    form: &MultipartForm,
    exclude_id: Option<i32>,
) -> Result<Slug, String> {
    let input = form
        .optional("slug")
        .unwrap_or_else(|| form.text("title").to_owned());

    unique_slug(&SlugRepository::new(state.pool()), table, &input, exclude_id)
        .await
        .map_err(|e| match e {
            UniqueSlugError::Invalid(_) => {
                "The slug needs at least one letter or number".to_owned()
            }
            UniqueSlugError::Store(err) => {
                tracing::error!(table = table.table_name(), error = %err, "Slug lookup failed");
                "Could not check the slug, please try again".to_owned()
            }
            UniqueSlugError::Exhausted { base, .. } => {
                format!("Too many entries already use \"{base}\"; choose another slug")
            }
        })
}

/// Form message for a failed upload.
pub(crate) fn upload_message(error: &UploadError) -> String {
    match error {
        UploadError::Storage(e) => {
            tracing::error!(error = %e, "Image upload failed");
            "The image could not be uploaded, please try again".to_owned()
        }
        other => other.to_string(),
    }
}

/// Form message for a failed insert or update.
pub(crate) fn save_message(error: &RepositoryError) -> String {
    match error {
        RepositoryError::Conflict(msg) => format!("Could not save: {msg}"),
        other => {
            tracing::error!(error = %other, "Failed to save");
            "Could not save, please try again".to_owned()
        }
    }
}

/// Create a CRUD router for one entity.
macro_rules! crud_routes {
    ($module:ident) => {
        Router::new()
            .route("/", get($module::index).post($module::create))
            .route("/new", get($module::new_form))
            .route("/{id}/edit", get($module::edit_form))
            .route("/{id}", post($module::update))
            .route("/{id}/delete", post($module::delete))
    };
}

/// Create the back-office router, mounted at `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/products", crud_routes!(products))
        .nest("/categories", crud_routes!(categories))
        .nest("/posts", crud_routes!(posts))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/media", get(media::index).post(media::upload))
        .route("/media/delete", post(media::delete))
        .route("/users", get(users::index).post(users::add))
        .route("/users/{id}/delete", post(users::remove))
        .layer(DefaultBodyLimit::max(ADMIN_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(path: &'static str) -> AdminLayout {
        AdminLayout {
            email: "admin@example.com".into(),
            current_path: path,
        }
    }

    #[test]
    fn test_active_section() {
        assert!(layout("/admin").is_active("/admin"));
        assert!(!layout("/admin/products").is_active("/admin"));
        assert!(layout("/admin/products").is_active("/admin/products"));
        assert!(!layout("/admin/posts").is_active("/admin/products"));
    }

    #[test]
    fn test_conflict_message_is_shown() {
        assert_eq!(
            save_message(&RepositoryError::Conflict("slug already exists".into())),
            "Could not save: slug already exists"
        );
    }

    #[test]
    fn test_upload_validation_message_passes_through() {
        assert!(upload_message(&UploadError::TooLarge).contains("larger than"));
    }
}
