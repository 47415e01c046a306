//! Order management handlers.
//!
//! Payment is not taken online, so admins move both the fulfilment status
//! and the payment status by hand.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderItem};
use crate::state::AppState;

use super::AdminLayout;

const SECTION: &str = "/admin/orders";

/// Query parameters of the order list.
#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
}

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    pub payment_status: String,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin: AdminLayout,
    pub orders: Vec<Order>,
    pub statuses: Vec<OrderStatus>,
    /// Active filter, empty for all.
    pub selected: String,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders/show.html")]
pub struct OrderShowTemplate {
    pub admin: AdminLayout,
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub statuses: Vec<OrderStatus>,
    pub payment_statuses: Vec<PaymentStatus>,
}

/// List orders, newest first. An unknown status filter shows everything.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse> {
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<OrderStatus>().ok());

    let orders = OrderRepository::new(state.pool()).list(status, None).await?;

    Ok(OrdersIndexTemplate {
        admin: AdminLayout::new(&user, SECTION),
        orders,
        statuses: OrderStatus::ALL.to_vec(),
        selected: status.map(|s| s.as_str().to_owned()).unwrap_or_default(),
    })
}

/// Display an order and its items.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let items = repo.items(id).await?;

    Ok(OrderShowTemplate {
        admin: AdminLayout::new(&user, SECTION),
        order,
        items,
        statuses: OrderStatus::ALL.to_vec(),
        payment_statuses: PaymentStatus::ALL.to_vec(),
    })
}

/// Set an order's status and payment status.
#[instrument(skip(state, user))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let status = form
        .status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let payment_status = form
        .payment_status
        .parse::<PaymentStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let order = OrderRepository::new(state.pool())
        .update_status(id, status, payment_status)
        .await?;

    tracing::info!(
        order_id = %order.id,
        status = %order.status,
        payment_status = %order.payment_status,
        admin = %user.email,
        "Order status updated"
    );

    Ok(Redirect::to(&format!("{SECTION}/{id}")))
}
