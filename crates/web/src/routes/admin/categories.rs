//! Category management handlers.
//!
//! Deleting a category leaves its products in place without a category.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use emporium_core::{Bucket, CategoryId, SlugTable};

use crate::db::{CategoryFields, CategoryRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Category;
use crate::state::AppState;
use crate::uploads::{ImageChoice, MultipartForm, resolve_image};

use super::{AdminLayout, resolve_slug, save_message, upload_message};

const SECTION: &str = "/admin/categories";

/// Category form values as typed.
#[derive(Debug, Clone, Default)]
pub struct CategoryFormValues {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub image_url: String,
}

impl From<&Category> for CategoryFormValues {
    fn from(category: &Category) -> Self {
        Self {
            title: category.title.clone(),
            slug: category.slug.clone(),
            description: category.description.clone().unwrap_or_default(),
            image_url: category.image_url.clone().unwrap_or_default(),
        }
    }
}

impl From<&MultipartForm> for CategoryFormValues {
    fn from(form: &MultipartForm) -> Self {
        Self {
            title: form.text("title").to_owned(),
            slug: form.text("slug").to_owned(),
            description: form.text("description").to_owned(),
            image_url: form.text("image_url").to_owned(),
        }
    }
}

impl From<&CategoryFields> for CategoryFormValues {
    fn from(fields: &CategoryFields) -> Self {
        Self {
            title: fields.title.clone(),
            slug: fields.slug.clone(),
            description: fields.description.clone().unwrap_or_default(),
            image_url: fields.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Category list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub admin: AdminLayout,
    pub categories: Vec<Category>,
}

/// Category editor template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories/form.html")]
pub struct CategoryFormTemplate {
    pub admin: AdminLayout,
    pub action: String,
    pub is_edit: bool,
    pub values: CategoryFormValues,
    pub error: Option<String>,
}

fn render_form(
    admin: AdminLayout,
    id: Option<CategoryId>,
    values: CategoryFormValues,
    error: Option<String>,
) -> Response {
    CategoryFormTemplate {
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
    id: Option<CategoryId>,
) -> std::result::Result<(CategoryFields, ImageChoice), (CategoryFormValues, String)> {
    let form = MultipartForm::read(multipart)
        .await
        .map_err(|e| (CategoryFormValues::default(), upload_message(&e)))?;
    let values = CategoryFormValues::from(&form);

    if form.text("title").is_empty() {
        return Err((values, "Title is required".to_owned()));
    }

    let slug = resolve_slug(state, SlugTable::Categories, &form, id.map(|id| id.as_i32()))
        .await
        .map_err(|message| (values.clone(), message))?;

    let image = resolve_image(state.supabase(), Bucket::CategoryImages, &form)
        .await
        .map_err(|e| (values.clone(), upload_message(&e)))?;

    let fields = CategoryFields {
        title: form.text("title").to_owned(),
        slug: slug.into_inner(),
        description: form.optional("description"),
        image_url: image.url.clone(),
    };
    Ok((fields, image))
}

/// List every category.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;
    Ok(CategoriesIndexTemplate {
        admin: AdminLayout::new(&user, SECTION),
        categories,
    })
}

/// Display an empty category form.
#[instrument(skip(user))]
pub async fn new_form(RequireAuth(user): RequireAuth) -> Response {
    render_form(
        AdminLayout::new(&user, SECTION),
        None,
        CategoryFormValues::default(),
        None,
    )
}

/// Create a category.
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

    let saved = CategoryRepository::new(state.pool()).create(&fields).await;
    if saved.is_err() {
        image.discard(state.supabase(), Bucket::CategoryImages).await;
    }

    match saved {
        Ok(category) => {
            tracing::info!(category_id = %category.id, slug = %category.slug, admin = %user.email, "Category created");
            Redirect::to(SECTION).into_response()
        }
        Err(e) => render_form(
            admin,
            None,
            CategoryFormValues::from(&fields),
            Some(save_message(&e)),
        ),
    }
}

/// Display the form for an existing category.
#[instrument(skip(state, user))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    let category = CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    Ok(render_form(
        AdminLayout::new(&user, SECTION),
        Some(id),
        CategoryFormValues::from(&category),
        None,
    ))
}

/// Update a category.
#[instrument(skip(state, user, multipart))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CategoryId>,
    multipart: Multipart,
) -> Result<Response> {
    let admin = AdminLayout::new(&user, SECTION);

    let (fields, image) = match read_fields(&state, multipart, Some(id)).await {
        Ok(read) => read,
        Err((values, message)) => return Ok(render_form(admin, Some(id), values, Some(message))),
    };

    let saved = CategoryRepository::new(state.pool()).update(id, &fields).await;
    if saved.is_err() {
        image.discard(state.supabase(), Bucket::CategoryImages).await;
    }

    match saved {
        Ok(_) => {
            tracing::info!(category_id = %id, admin = %user.email, "Category updated");
            Ok(Redirect::to(SECTION).into_response())
        }
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("category {id}"))),
        Err(e) => Ok(render_form(
            admin,
            Some(id),
            CategoryFormValues::from(&fields),
            Some(save_message(&e)),
        )),
    }
}

/// Delete a category; its products keep existing without one.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CategoryId>,
) -> Result<Redirect> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    tracing::info!(category_id = %id, admin = %user.email, "Category deleted");
    Ok(Redirect::to(SECTION))
}
