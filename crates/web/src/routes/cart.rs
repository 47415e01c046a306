//! Cart route handlers.
//!
//! The cart is an [`emporium_core::Cart`] kept in the visitor's session.
//! Every mutation loads it, applies the change and writes it back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{Cart, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session::keys;
use crate::routes::Layout;
use crate::state::AppState;

// =============================================================================
// Session helpers
// =============================================================================

/// Load the session cart, empty if there is none.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> std::result::Result<Cart, tower_sessions::session::Error> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Write the cart back to the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// Turn a submitted quantity into a cart quantity.
///
/// Anything below one is zero and anything above [`Cart::MAX_LINE_QUANTITY`]
/// is capped.
fn clamp_quantity(quantity: i64) -> u32 {
    if quantity < 1 {
        0
    } else {
        u32::try_from(quantity)
            .unwrap_or(u32::MAX)
            .min(Cart::MAX_LINE_QUANTITY)
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: ProductId,
    pub quantity: Option<i64>,
}

/// Quantity update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove form data.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub product_id: ProductId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub layout: Layout,
    pub cart: Cart,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the cart.
#[instrument(skip(session, layout))]
pub async fn show(session: Session, layout: Layout) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    Ok(CartTemplate { layout, cart })
}

/// Add a product to the cart.
///
/// The product is looked up so the cart holds a current snapshot.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddForm>,
) -> Result<Redirect> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    if !product.in_stock() {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            product.title
        )));
    }

    let mut cart = load_cart(&session).await?;
    cart.add(product.cart_item(), clamp_quantity(form.quantity.unwrap_or(1)));
    save_cart(&session, &cart).await?;

    tracing::debug!(product_id = %product.id, items = cart.item_count(), "Added to cart");
    Ok(Redirect::to("/cart"))
}

/// Change the quantity of a line; below one removes it.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateForm>) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(form.product_id, clamp_quantity(form.quantity));
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// Remove a product from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveForm>) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;
    cart.remove(form.product_id);
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Redirect> {
    save_cart(&session, &Cart::new()).await?;
    Ok(Redirect::to("/cart"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(-3), 0);
        assert_eq!(clamp_quantity(0), 0);
        assert_eq!(clamp_quantity(4), 4);
        assert_eq!(clamp_quantity(i64::MAX), Cart::MAX_LINE_QUANTITY);
        assert_eq!(clamp_quantity(3_000_000_000), Cart::MAX_LINE_QUANTITY);
    }
}
