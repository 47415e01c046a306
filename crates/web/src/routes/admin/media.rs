//! Media library handlers: browse, upload and remove bucket objects.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::Bucket;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::supabase::{StorageObject, validate_object_name};
use crate::uploads::{MultipartForm, store_image};

use super::{AdminLayout, upload_message};

const SECTION: &str = "/admin/media";

/// Query parameters of the media page.
#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub bucket: Option<String>,
}

/// Remove form data.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub bucket: String,
    pub name: String,
}

/// An object as listed on the media page.
#[derive(Debug, Clone)]
pub struct MediaObject {
    pub name: String,
    pub url: String,
    pub size: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Media page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/media/index.html")]
pub struct MediaTemplate {
    pub admin: AdminLayout,
    pub buckets: Vec<Bucket>,
    pub bucket: Bucket,
    pub objects: Vec<MediaObject>,
    pub error: Option<String>,
}

/// Bucket named in a query or form, defaulting to product images.
fn bucket_or_default(raw: Option<&str>) -> Bucket {
    raw.and_then(|b| b.parse().ok()).unwrap_or(Bucket::ProductImages)
}

/// Byte count in the largest whole unit, one decimal place.
#[allow(clippy::cast_precision_loss)]
fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let label = UNITS.get(unit).copied().unwrap_or("B");
    if unit == 0 {
        format!("{bytes} {label}")
    } else {
        format!("{size:.1} {label}")
    }
}

fn media_object(state: &AppState, bucket: Bucket, object: StorageObject) -> MediaObject {
    MediaObject {
        url: state.supabase().public_url(bucket, &object.name),
        size: object.size().map(human_size).unwrap_or_default(),
        created_at: object.created_at,
        name: object.name,
    }
}

async fn render_index(
    state: &AppState,
    admin: AdminLayout,
    bucket: Bucket,
    error: Option<String>,
) -> Result<Response> {
    let objects = state
        .supabase()
        .list_objects(bucket)
        .await?
        .into_iter()
        .map(|object| media_object(state, bucket, object))
        .collect();

    Ok(MediaTemplate {
        admin,
        buckets: Bucket::ALL.to_vec(),
        bucket,
        objects,
        error,
    }
    .into_response())
}

/// List the objects of a bucket.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MediaQuery>,
) -> Result<Response> {
    let bucket = bucket_or_default(query.bucket.as_deref());
    render_index(&state, AdminLayout::new(&user, SECTION), bucket, None).await
}

/// Upload an image under a generated name.
#[instrument(skip(state, user, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let admin = AdminLayout::new(&user, SECTION);

    let form = match MultipartForm::read(multipart).await {
        Ok(form) => form,
        Err(e) => {
            return render_index(&state, admin, Bucket::ProductImages, Some(upload_message(&e)))
                .await;
        }
    };
    let bucket = bucket_or_default(form.optional("bucket").as_deref());

    let Some(file) = form.file() else {
        return render_index(&state, admin, bucket, Some("Choose a file to upload".to_owned()))
            .await;
    };

    match store_image(state.supabase(), bucket, file).await {
        Ok(url) => {
            tracing::info!(bucket = %bucket, url = %url, admin = %user.email, "Media uploaded");
            Ok(Redirect::to(&format!("{SECTION}?bucket={bucket}")).into_response())
        }
        Err(e) => render_index(&state, admin, bucket, Some(upload_message(&e))).await,
    }
}

/// Remove an object from a bucket.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveForm>,
) -> Result<Redirect> {
    let bucket = form
        .bucket
        .parse::<Bucket>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let name =
        validate_object_name(&form.name).map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.supabase().remove_objects(bucket, &[name]).await?;

    tracing::info!(bucket = %bucket, name = %name, admin = %user.email, "Media removed");
    Ok(Redirect::to(&format!("{SECTION}?bucket={bucket}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_unknown_bucket_falls_back() {
        assert_eq!(bucket_or_default(Some("blog-images")), Bucket::BlogImages);
        assert_eq!(bucket_or_default(Some("secrets")), Bucket::ProductImages);
        assert_eq!(bucket_or_default(None), Bucket::ProductImages);
    }
}
