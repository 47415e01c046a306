//! Blog post management handlers.
//!
//! Posts are written in Markdown. `published_at` is stamped the first time a
//! post is published and kept if it is later unpublished.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use emporium_core::{BlogPostId, Bucket, SlugTable};

use crate::db::{BlogPostFields, BlogPostRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::BlogPost;
use crate::state::AppState;
use crate::uploads::{ImageChoice, MultipartForm, resolve_image};

use super::{AdminLayout, resolve_slug, save_message, upload_message};

const SECTION: &str = "/admin/posts";

/// Post form values as typed.
#[derive(Debug, Clone, Default)]
pub struct PostFormValues {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: String,
    pub published: bool,
}

impl From<&BlogPost> for PostFormValues {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone().unwrap_or_default(),
            image_url: post.image_url.clone().unwrap_or_default(),
            published: post.published,
        }
    }
}

impl From<&MultipartForm> for PostFormValues {
    fn from(form: &MultipartForm) -> Self {
        Self {
            title: form.text("title").to_owned(),
            slug: form.text("slug").to_owned(),
            content: form.text("content").to_owned(),
            excerpt: form.text("excerpt").to_owned(),
            image_url: form.text("image_url").to_owned(),
            published: form.checked("published"),
        }
    }
}

impl From<&BlogPostFields> for PostFormValues {
    fn from(fields: &BlogPostFields) -> Self {
        Self {
            title: fields.title.clone(),
            slug: fields.slug.clone(),
            content: fields.content.clone(),
            excerpt: fields.excerpt.clone().unwrap_or_default(),
            image_url: fields.image_url.clone().unwrap_or_default(),
            published: fields.published,
        }
    }
}

/// Post list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/posts/index.html")]
pub struct PostsIndexTemplate {
    pub admin: AdminLayout,
    pub posts: Vec<BlogPost>,
}

/// Post editor template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/posts/form.html")]
pub struct PostFormTemplate {
    pub admin: AdminLayout,
    pub action: String,
    pub is_edit: bool,
    pub values: PostFormValues,
    pub error: Option<String>,
}

fn render_form(
    admin: AdminLayout,
    id: Option<BlogPostId>,
    values: PostFormValues,
    error: Option<String>,
) -> Response {
    PostFormTemplate {
        admin,
        action: id.map_or_else(|| SECTION.to_owned(), |id| format!("{SECTION}/{id}")),
        is_edit: id.is_some(),
        values,
        error,
    }
    .into_response()
}

async fn read_fields(
    state: &AppState,
    multipart: Multipart,
    id: Option<BlogPostId>,
) -> std::result::Result<(BlogPostFields, ImageChoice), (PostFormValues, String)> {
    let form = MultipartForm::read(multipart)
        .await
        .map_err(|e| (PostFormValues::default(), upload_message(&e)))?;
    let values = PostFormValues::from(&form);

    if form.text("title").is_empty() {
        return Err((values, "Title is required".to_owned()));
    }
    if form.text("content").is_empty() {
        return Err((values, "Content is required".to_owned()));
    }

    let slug = resolve_slug(state, SlugTable::BlogPosts, &form, id.map(|id| id.as_i32()))
        .await
        .map_err(|message| (values.clone(), message))?;

    let image = resolve_image(state.supabase(), Bucket::BlogImages, &form)
        .await
        .map_err(|e| (values.clone(), upload_message(&e)))?;

    let fields = BlogPostFields {
        title: form.text("title").to_owned(),
        slug: slug.into_inner(),
        content: form.text("content").to_owned(),
        excerpt: form.optional("excerpt"),
        image_url: image.url.clone(),
        published: form.checked("published"),
    };
    Ok((fields, image))
}

/// List every post, drafts included.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let posts = BlogPostRepository::new(state.pool()).list_all().await?;
    Ok(PostsIndexTemplate {
        admin: AdminLayout::new(&user, SECTION),
        posts,
    })
}

/// Display an empty post form.
#[instrument(skip(user))]
pub async fn new_form(RequireAuth(user): RequireAuth) -> Response {
    render_form(
        AdminLayout::new(&user, SECTION),
        None,
        PostFormValues::default(),
        None,
    )
}

/// Create a post.
#[instrument(skip(state, user, multipart))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Response {
    let admin = AdminLayout::new(&user, SECTION);

    let (fields, image) = match read_fields(&state, multipart, None).await {
        Ok(read) => read,
        Err((values, message)) => return render_form(admin, None, values, Some(message)),
    };

    let saved = BlogPostRepository::new(state.pool()).create(&fields).await;
    if saved.is_err() {
        image.discard(state.supabase(), Bucket::BlogImages).await;
    }

    match saved {
        Ok(post) => {
            tracing::info!(
                post_id = %post.id,
                slug = %post.slug,
                published = post.published,
                admin = %user.email,
                "Post created"
            );
            Redirect::to(SECTION).into_response()
        }
        Err(e) => render_form(
            admin,
            None,
            PostFormValues::from(&fields),
            Some(save_message(&e)),
        ),
    }
}

/// Display the form for an existing post.
#[instrument(skip(state, user))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<BlogPostId>,
) -> Result<Response> {
    let post = BlogPostRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {id}")))?;

    Ok(render_form(
        AdminLayout::new(&user, SECTION),
        Some(id),
        PostFormValues::from(&post),
        None,
    ))
}

/// Update a post.
#[instrument(skip(state, user, multipart))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<BlogPostId>,
    multipart: Multipart,
) -> Result<Response> {
    let admin = AdminLayout::new(&user, SECTION);

    let (fields, image) = match read_fields(&state, multipart, Some(id)).await {
        Ok(read) => read,
        Err((values, message)) => return Ok(render_form(admin, Some(id), values, Some(message))),
    };

    let saved = BlogPostRepository::new(state.pool()).update(id, &fields).await;
    if saved.is_err() {
        image.discard(state.supabase(), Bucket::BlogImages).await;
    }

    match saved {
        Ok(post) => {
            tracing::info!(post_id = %id, published = post.published, admin = %user.email, "Post updated");
            Ok(Redirect::to(SECTION).into_response())
        }
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("post {id}"))),
        Err(e) => Ok(render_form(
            admin,
            Some(id),
            PostFormValues::from(&fields),
            Some(save_message(&e)),
        )),
    }
}

/// Delete a post.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<BlogPostId>,
) -> Result<Redirect> {
    BlogPostRepository::new(state.pool()).delete(id).await?;
    tracing::info!(post_id = %id, admin = %user.email, "Post deleted");
    Ok(Redirect::to(SECTION))
}
