//! Object storage: upload, list, remove and public URLs.

use emporium_core::Bucket;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::{KeyKind, StorageObject, SupabaseClient, SupabaseError};

/// Upper bound on objects returned by one listing.
const LIST_LIMIT: u32 = 100;

/// Rejected object names.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjectNameError {
    #[error("object name is empty")]
    Empty,
    #[error("object name must not contain path separators")]
    PathSeparator,
    #[error("object name must not start with a dot")]
    Hidden,
}

/// Accept only flat names such as `0b6f...e1.png`.
///
/// # Errors
///
/// Returns `ObjectNameError` for empty, nested or hidden names.
pub fn validate_object_name(name: &str) -> Result<&str, ObjectNameError> {
    if name.is_empty() {
        return Err(ObjectNameError::Empty);
    }
    if name.contains('/') || name.contains('\\') {
        return Err(ObjectNameError::PathSeparator);
    }
    if name.starts_with('.') {
        return Err(ObjectNameError::Hidden);
    }
    Ok(name)
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: u32,
    offset: u32,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

#[derive(Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [&'a str],
}

impl SupabaseClient {
    /// Public URL of an object in a public bucket.
    #[must_use]
    pub fn public_url(&self, bucket: Bucket, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{}",
            self.base_url(),
            urlencoding::encode(name)
        )
    }

    /// Store `bytes` as `name` and return its public URL.
    ///
    /// Existing objects are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if the service rejects the upload.
    pub async fn upload(
        &self,
        bucket: Bucket,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, SupabaseError> {
        let name = validate_object_name(name)
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;
        let path = format!("/storage/v1/object/{bucket}/{}", urlencoding::encode(name));

        let request = self.authorize(self.inner.client.post(self.url(&path)), KeyKind::ServiceRole);
        let response = request
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        Self::expect_success(response).await?;
        Ok(self.public_url(bucket, name))
    }

    /// Newest objects in a bucket, folder placeholders excluded.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the listing fails.
    pub async fn list_objects(&self, bucket: Bucket) -> Result<Vec<StorageObject>, SupabaseError> {
        let request = ListRequest {
            prefix: "",
            limit: LIST_LIMIT,
            offset: 0,
            sort_by: SortBy {
                column: "created_at",
                order: "desc",
            },
        };

        let objects: Vec<StorageObject> = self
            .post(
                &format!("/storage/v1/object/list/{bucket}"),
                KeyKind::ServiceRole,
                &request,
            )
            .await?;

        Ok(objects
            .into_iter()
            .filter(|object| object.id.is_some())
            .collect())
    }

    /// Remove objects from a bucket.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the removal fails.
    pub async fn remove_objects(&self, bucket: Bucket, names: &[&str]) -> Result<(), SupabaseError> {
        for name in names {
            validate_object_name(name).map_err(|e| SupabaseError::Parse(e.to_string()))?;
        }

        let request = self.authorize(
            self.inner
                .client
                .delete(self.url(&format!("/storage/v1/object/{bucket}"))),
            KeyKind::ServiceRole,
        );
        let response = request.json(&RemoveRequest { prefixes: names }).send().await?;

        // The service answers with the list of removed objects
        let _removed: Value = Self::handle_response(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::SupabaseConfig;

    #[test]
    fn test_public_url() {
        let client = SupabaseClient::new(&SupabaseConfig {
            url: "https://abcd.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            service_role_key: SecretString::from("service"),
        })
        .unwrap();

        assert_eq!(
            client.public_url(Bucket::BlogImages, "photo.png"),
            "https://abcd.supabase.co/storage/v1/object/public/blog-images/photo.png"
        );
    }

    #[test]
    fn test_validate_object_name() {
        assert_eq!(validate_object_name("a1b2.jpg"), Ok("a1b2.jpg"));
        assert_eq!(validate_object_name(""), Err(ObjectNameError::Empty));
        assert_eq!(
            validate_object_name("../secrets"),
            Err(ObjectNameError::PathSeparator)
        );
        assert_eq!(validate_object_name(".env"), Err(ObjectNameError::Hidden));
    }

    #[test]
    fn test_list_request_shape() {
        let request = ListRequest {
            prefix: "",
            limit: 10,
            offset: 0,
            sort_by: SortBy {
                column: "name",
                order: "asc",
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sortBy"]["column"], "name");
        assert_eq!(json["limit"], 10);
    }
}
