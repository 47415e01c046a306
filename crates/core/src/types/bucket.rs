//! Object-storage buckets used for uploaded images.

use serde::{Deserialize, Serialize};

/// Error returned for an unknown bucket name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown bucket: {0}")]
pub struct BucketError(String);

/// A public storage bucket. Each content type keeps its images apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    #[default]
    ProductImages,
    BlogImages,
    CategoryImages,
}

impl Bucket {
    /// Every bucket, in the order the media page lists them.
    pub const ALL: [Self; 3] = [Self::ProductImages, Self::BlogImages, Self::CategoryImages];

    /// Bucket name in the storage service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProductImages => "product-images",
            Self::BlogImages => "blog-images",
            Self::CategoryImages => "category-images",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProductImages => "Product images",
            Self::BlogImages => "Blog images",
            Self::CategoryImages => "Category images",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Bucket {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| BucketError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_names() {
        assert_eq!(Bucket::ProductImages.as_str(), "product-images");
        assert_eq!("blog-images".parse::<Bucket>().unwrap(), Bucket::BlogImages);
        assert!("avatars".parse::<Bucket>().is_err());
    }

    #[test]
    fn test_serde_uses_bucket_name() {
        let parsed: Bucket = serde_json::from_str("\"category-images\"").unwrap();
        assert_eq!(parsed, Bucket::CategoryImages);
    }
}
