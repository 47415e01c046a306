//! Category and product pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{Category, Product};
use crate::routes::Layout;
use crate::state::AppState;

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub layout: Layout,
    pub categories: Vec<Category>,
}

/// Category detail template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryTemplate {
    pub layout: Layout,
    pub category: Category,
    pub products: Vec<Product>,
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub layout: Layout,
    pub query: String,
    pub products: Vec<Product>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub product: Product,
    pub category: Option<Category>,
}

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Display all categories.
#[instrument(skip(state, layout))]
pub async fn categories(
    State(state): State<AppState>,
    layout: Layout,
) -> Result<impl IntoResponse> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;
    Ok(CategoriesTemplate { layout, categories })
}

/// Display a category and its products.
#[instrument(skip(state, layout))]
pub async fn category(
    State(state): State<AppState>,
    layout: Layout,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let category = CategoryRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let products = ProductRepository::new(state.pool())
        .list_by_category(category.id)
        .await?;

    Ok(CategoryTemplate {
        layout,
        category,
        products,
    })
}

/// Display the product listing, optionally filtered by title.
#[instrument(skip(state, layout))]
pub async fn products(
    State(state): State<AppState>,
    layout: Layout,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let query = query.q.unwrap_or_default().trim().to_owned();
    let search = (!query.is_empty()).then_some(query.as_str());

    let products = ProductRepository::new(state.pool()).search(search).await?;

    Ok(ProductsTemplate {
        layout,
        query,
        products,
    })
}

/// Display a product.
#[instrument(skip(state, layout))]
pub async fn product(
    State(state): State<AppState>,
    layout: Layout,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let category = match product.category_id {
        Some(id) => CategoryRepository::new(state.pool()).get_by_id(id).await?,
        None => None,
    };

    Ok(ProductTemplate {
        layout,
        product,
        category,
    })
}
