//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::{BlogPostRepository, CategoryRepository, OrderRepository, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderStats};
use crate::state::AppState;

use super::AdminLayout;

const RECENT_ORDERS: i64 = 5;

/// Catalogue and content counts.
#[derive(Debug, Clone, Copy)]
pub struct ContentCounts {
    pub products: i64,
    pub categories: i64,
    pub posts: i64,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin: AdminLayout,
    pub counts: ContentCounts,
    pub stats: OrderStats,
    pub recent_orders: Vec<Order>,
}

/// Dashboard handler.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let orders = OrderRepository::new(pool);
    let product_repo = ProductRepository::new(pool);
    let category_repo = CategoryRepository::new(pool);
    let post_repo = BlogPostRepository::new(pool);

    let (products, categories, posts, stats, recent_orders) = tokio::try_join!(
        product_repo.count(),
        category_repo.count(),
        post_repo.count(),
        orders.stats(),
        orders.list(None, Some(RECENT_ORDERS)),
    )?;

    Ok(DashboardTemplate {
        admin: AdminLayout::new(&user, "/admin"),
        counts: ContentCounts {
            products,
            categories,
            posts,
        },
        stats,
        recent_orders,
    })
}
