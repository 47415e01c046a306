//! Blog posts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use emporium_core::BlogPostId;

/// A blog post. `content` is Markdown.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub published: bool,
    /// Set the first time the post is published and never cleared.
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    /// Date shown to readers: first publication, else creation.
    #[must_use]
    pub fn display_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    /// Excerpt, or the first 160 characters of the content.
    #[must_use]
    pub fn summary(&self) -> String {
        if let Some(excerpt) = self.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
            return excerpt.to_string();
        }
        let mut summary: String = self.content.chars().take(160).collect();
        if self.content.chars().count() > 160 {
            summary.push('…');
        }
        summary
    }
}
