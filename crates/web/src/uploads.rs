//! Multipart form parsing and image uploads for the back-office.
//!
//! Admin forms are `multipart/form-data` so an image can be attached. Text
//! fields are collected into a map; at most one file part is kept.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use thiserror::Error;
use uuid::Uuid;

use emporium_core::Bucket;

use crate::supabase::{SupabaseClient, SupabaseError};

/// Largest accepted image.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit for admin routes: one image plus the text fields.
pub const ADMIN_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// Errors from reading or storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image is larger than {} MB", MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge,

    #[error("only image files can be uploaded (got {0})")]
    NotAnImage(String),

    #[error("malformed form data: {0}")]
    Multipart(#[from] MultipartError),

    #[error("storage upload failed: {0}")]
    Storage(#[from] SupabaseError),
}

/// A file part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Check size and type, and pick the stored file name.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::TooLarge` or `UploadError::NotAnImage`.
    pub fn validate(&self) -> Result<String, UploadError> {
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge);
        }
        let extension = image_extension(&self.content_type, &self.file_name)
            .ok_or_else(|| UploadError::NotAnImage(self.content_type.clone()))?;
        Ok(format!("{}.{extension}", Uuid::new_v4()))
    }
}

/// File extension for an accepted image type.
///
/// SVG is refused since it can carry script.
fn image_extension(content_type: &str, file_name: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        other if other.starts_with("image/") && other != "image/svg+xml" => {
            // Unusual but harmless image types keep a sanitized extension
            file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .and_then(|ext| match ext.as_str() {
                    "bmp" => Some("bmp"),
                    "tif" | "tiff" => Some("tiff"),
                    "ico" => Some("ico"),
                    _ => None,
                })
        }
        _ => None,
    }
}

/// Text fields and the optional file of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl MultipartForm {
    /// Read every part of the request.
    ///
    /// An empty file input (no file chosen) yields no file. Files over the
    /// size limit are rejected as soon as they are read.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Multipart` for malformed bodies and
    /// `UploadError::TooLarge` for oversized files.
    pub async fn read(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_owned) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await?;

                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(UploadError::TooLarge);
                }

                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// A text field, trimmed. Missing fields read as empty.
    #[must_use]
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", |v| v.trim())
    }

    /// A trimmed text field, `None` when blank.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<String> {
        let value = self.text(name);
        (!value.is_empty()).then(|| value.to_owned())
    }

    /// Whether a checkbox was ticked.
    #[must_use]
    pub fn checked(&self, name: &str) -> bool {
        matches!(self.text(name), "on" | "true" | "1")
    }

    #[must_use]
    pub const fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn from_fields(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            file: None,
        }
    }
}

/// Validate and store an image, returning its public URL.
///
/// # Errors
///
/// Returns `UploadError` if the file is rejected or the upload fails.
pub async fn store_image(
    supabase: &SupabaseClient,
    bucket: Bucket,
    file: &UploadedFile,
) -> Result<String, UploadError> {
    upload_image(supabase, bucket, file).await.map(|(_, url)| url)
}

async fn upload_image(
    supabase: &SupabaseClient,
    bucket: Bucket,
    file: &UploadedFile,
) -> Result<(String, String), UploadError> {
    let name = file.validate()?;
    let url = supabase
        .upload(bucket, &name, &file.content_type, file.bytes.clone())
        .await?;

    tracing::info!(bucket = %bucket, name = %name, size = file.bytes.len(), "Image uploaded");
    Ok((name, url))
}

/// Image picked for an edited record.
#[derive(Debug, Default)]
pub struct ImageChoice {
    /// URL to store on the record.
    pub url: Option<String>,
    /// Object written while handling this form.
    pub uploaded: Option<String>,
}

impl ImageChoice {
    /// Remove the object this form uploaded, after the record failed to save.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn discard(&self, supabase: &SupabaseClient, bucket: Bucket) {
        let Some(name) = self.uploaded.as_deref() else {
            return;
        };

        match supabase.remove_objects(bucket, &[name]).await {
            Ok(()) => tracing::info!(bucket = %bucket, name = %name, "Unsaved upload removed"),
            Err(e) => {
                tracing::warn!(bucket = %bucket, name = %name, error = %e, "Unsaved upload left behind");
            }
        }
    }
}

/// Image for an edited record: a new upload wins, then the URL field,
/// then nothing.
///
/// # Errors
///
/// Returns `UploadError` if a new file is rejected or the upload fails.
pub async fn resolve_image(
    supabase: &SupabaseClient,
    bucket: Bucket,
    form: &MultipartForm,
) -> Result<ImageChoice, UploadError> {
    match form.file() {
        Some(file) => {
            let (name, url) = upload_image(supabase, bucket, file).await?;
            Ok(ImageChoice {
                url: Some(url),
                uploaded: Some(name),
            })
        }
        None => Ok(ImageChoice {
            url: form.optional("image_url"),
            uploaded: None,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(content_type: &str, name: &str, len: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.to_owned(),
            content_type: content_type.to_owned(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn test_accepts_common_images() {
        let name = file("image/png", "a.png", 10).validate().unwrap();
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 36 + 4);

        let name = file("image/jpeg; charset=binary", "a.jpeg", 10).validate().unwrap();
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_rejects_non_images_and_svg() {
        assert!(matches!(
            file("text/html", "a.html", 10).validate(),
            Err(UploadError::NotAnImage(_))
        ));
        assert!(matches!(
            file("image/svg+xml", "a.svg", 10).validate(),
            Err(UploadError::NotAnImage(_))
        ));
    }

    #[test]
    fn test_rejects_oversized() {
        assert!(matches!(
            file("image/png", "big.png", MAX_UPLOAD_BYTES + 1).validate(),
            Err(UploadError::TooLarge)
        ));
        assert!(file("image/png", "edge.png", MAX_UPLOAD_BYTES).validate().is_ok());
    }

    #[test]
    fn test_form_field_helpers() {
        let form = MultipartForm::from_fields(&[
            ("title", "  Tea  "),
            ("excerpt", "   "),
            ("published", "on"),
        ]);
        assert_eq!(form.text("title"), "Tea");
        assert_eq!(form.optional("excerpt"), None);
        assert_eq!(form.text("missing"), "");
        assert!(form.checked("published"));
        assert!(!form.checked("featured"));
    }

    fn unreachable_client() -> SupabaseClient {
        SupabaseClient::new(&crate::config::SupabaseConfig {
            url: "http://127.0.0.1:1".to_string(),
            anon_key: "anon".to_string(),
            service_role_key: secrecy::SecretString::from("service"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_image_url_field_is_not_an_upload() {
        let client = unreachable_client();
        let form = MultipartForm::from_fields(&[("image_url", "https://cdn.example.com/a.png")]);

        let choice = resolve_image(&client, Bucket::ProductImages, &form).await.unwrap();
        assert_eq!(choice.url.as_deref(), Some("https://cdn.example.com/a.png"));
        assert_eq!(choice.uploaded, None);

        let choice = resolve_image(&client, Bucket::ProductImages, &MultipartForm::from_fields(&[]))
            .await
            .unwrap();
        assert_eq!(choice.url, None);
    }

    #[tokio::test]
    async fn test_discard_tolerates_unreachable_storage() {
        let client = unreachable_client();
        let choice = ImageChoice {
            url: Some(client.public_url(Bucket::BlogImages, "a.png")),
            uploaded: Some("a.png".to_owned()),
        };
        choice.discard(&client, Bucket::BlogImages).await;

        ImageChoice::default().discard(&client, Bucket::BlogImages).await;
    }
}
