//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::BlogPostRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::markdown;
use crate::models::BlogPost;
use crate::routes::Layout;
use crate::state::AppState;

/// Blog index template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub layout: Layout,
    pub posts: Vec<BlogPost>,
}

/// Blog post template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogPostTemplate {
    pub layout: Layout,
    pub post: BlogPost,
    /// Rendered Markdown body.
    pub content_html: String,
}

/// Display published posts, newest first.
#[instrument(skip(state, layout))]
pub async fn index(State(state): State<AppState>, layout: Layout) -> Result<impl IntoResponse> {
    let posts = BlogPostRepository::new(state.pool())
        .list_published(None)
        .await?;
    Ok(BlogIndexTemplate { layout, posts })
}

/// Display a published post. Drafts are not found.
#[instrument(skip(state, layout))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let post = BlogPostRepository::new(state.pool())
        .get_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))?;

    let content_html = markdown::render(&post.content);

    Ok(BlogPostTemplate {
        layout,
        post,
        content_html,
    })
}
