//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::{BlogPostRepository, CategoryRepository, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::models::{BlogPost, Category, Product};
use crate::routes::Layout;
use crate::state::AppState;

const LATEST_PRODUCTS: i64 = 8;
const LATEST_POSTS: i64 = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub posts: Vec<BlogPost>,
}

/// Display the home page.
#[instrument(skip(state, layout))]
pub async fn home(State(state): State<AppState>, layout: Layout) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let product_repo = ProductRepository::new(pool);
    let category_repo = CategoryRepository::new(pool);
    let post_repo = BlogPostRepository::new(pool);

    let (products, categories, posts) = tokio::try_join!(
        product_repo.list_latest(LATEST_PRODUCTS),
        category_repo.list_all(),
        post_repo.list_published(Some(LATEST_POSTS)),
    )?;

    Ok(HomeTemplate {
        layout,
        products,
        categories,
        posts,
    })
}
