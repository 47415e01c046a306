//! Checkout route handlers.
//!
//! Placing an order reprices the session cart against the catalogue, writes
//! the order and its items in one transaction, empties the cart and remembers
//! the order id so only this session can view the confirmation page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{Cart, Email, OrderId, PaymentMethod};

use super::cart::{load_cart, save_cart};
use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{NewOrder, Order, OrderItem, Product, session::keys};
use crate::routes::Layout;
use crate::state::AppState;

/// Longest accepted value of a single-line field.
const MAX_FIELD_LEN: usize = 200;

/// Longest accepted order note.
const MAX_NOTES_LEN: usize = 2000;

// =============================================================================
// Form Types
// =============================================================================

/// Checkout form data, echoed back into the form when it is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub notes: String,
    pub payment_method: String,
}

impl CheckoutForm {
    /// Validate the contact and shipping fields and attach the cart.
    ///
    /// # Errors
    ///
    /// Returns a message for the first invalid field.
    pub fn into_new_order(self, cart: Cart) -> std::result::Result<NewOrder, String> {
        let required = [
            ("Name", &self.customer_name),
            ("Phone", &self.customer_phone),
            ("Address", &self.shipping_address),
            ("City", &self.shipping_city),
            ("Postal code", &self.shipping_postal_code),
        ];
        for (label, value) in required {
            let value = value.trim();
            if value.is_empty() {
                return Err(format!("{label} is required"));
            }
            if value.chars().count() > MAX_FIELD_LEN {
                return Err(format!("{label} is too long"));
            }
        }

        let customer_email = Email::parse(self.customer_email.trim())
            .map_err(|e| format!("Email address is not valid: {e}"))?;

        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|_| "Choose a payment method".to_owned())?;

        let notes = self.notes.trim();
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err("Notes are too long".to_owned());
        }

        Ok(NewOrder {
            customer_name: self.customer_name.trim().to_owned(),
            customer_email,
            customer_phone: self.customer_phone.trim().to_owned(),
            shipping_address: self.shipping_address.trim().to_owned(),
            shipping_city: self.shipping_city.trim().to_owned(),
            shipping_postal_code: self.shipping_postal_code.trim().to_owned(),
            notes: (!notes.is_empty()).then(|| notes.to_owned()),
            payment_method,
            cart,
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub cart: Cart,
    pub form: CheckoutForm,
    pub payment_methods: Vec<PaymentMethod>,
    pub error: Option<String>,
}

impl CheckoutTemplate {
    fn new(layout: Layout, cart: Cart, form: CheckoutForm, error: Option<String>) -> Self {
        Self {
            layout,
            cart,
            form,
            payment_methods: PaymentMethod::ALL.to_vec(),
            error,
        }
    }
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub layout: Layout,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the checkout form. An empty cart goes back to the cart page.
#[instrument(skip(session, layout, user))]
pub async fn form(
    session: Session,
    layout: Layout,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let form = CheckoutForm {
        customer_email: user.map(|u| u.email.into_inner()).unwrap_or_default(),
        payment_method: PaymentMethod::default().as_str().to_owned(),
        ..CheckoutForm::default()
    };

    Ok(CheckoutTemplate::new(layout, cart, form, None).into_response())
}

/// Place the order.
#[instrument(skip(state, session, layout, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let new_order = match form.clone().into_new_order(cart.clone()) {
        Ok(order) => order,
        Err(message) => {
            return Ok(CheckoutTemplate::new(layout, cart, form, Some(message)).into_response());
        }
    };

    // Charge what the catalogue says now, not what the cart remembered
    let products = ProductRepository::new(state.pool())
        .get_many(&cart.product_ids())
        .await?;
    let current: Vec<_> = products.iter().map(Product::current_price).collect();

    if cart.reprice(&current) {
        save_cart(&session, &cart).await?;
        if cart.is_empty() {
            return Ok(Redirect::to("/cart").into_response());
        }
        let message = "Some items in your cart changed price or are no longer available. \
                       Please review your order."
            .to_owned();
        return Ok(CheckoutTemplate::new(layout, cart, form, Some(message)).into_response());
    }

    let order = match OrderRepository::new(state.pool()).create(&new_order).await {
        Ok(order) => order,
        Err(e) => {
            tracing::error!(error = %e, "Failed to place order");
            let message = "We could not place your order. Please try again.".to_owned();
            return Ok(CheckoutTemplate::new(layout, cart, form, Some(message)).into_response());
        }
    };

    save_cart(&session, &Cart::new()).await?;
    session.insert(keys::LAST_ORDER_ID, order.id).await?;

    tracing::info!(
        order_id = %order.id,
        total = %order.total_amount,
        payment_method = %order.payment_method,
        "Order placed"
    );

    Ok(Redirect::to(&format!("/checkout/success/{}", order.id)).into_response())
}

/// Display the confirmation for the order placed in this session.
#[instrument(skip(state, session, layout))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let last_order = session.get::<OrderId>(keys::LAST_ORDER_ID).await?;
    if last_order != Some(id) {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let items = repo.items(id).await?;

    Ok(SuccessTemplate {
        layout,
        order,
        items,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            customer_name: " Ada Lovelace ".into(),
            customer_email: "ada@example.com".into(),
            customer_phone: "555-0100".into(),
            shipping_address: "12 Analytical Way".into(),
            shipping_city: "London".into(),
            shipping_postal_code: "N1 9GU".into(),
            notes: "   ".into(),
            payment_method: "bank_transfer".into(),
        }
    }

    #[test]
    fn test_valid_form_becomes_order() {
        let order = valid_form().into_new_order(Cart::new()).unwrap();
        assert_eq!(order.customer_name, "Ada Lovelace");
        assert_eq!(order.payment_method, PaymentMethod::BankTransfer);
        assert_eq!(order.notes, None);
    }

    #[test]
    fn test_missing_field_is_reported() {
        let form = CheckoutForm {
            shipping_city: "  ".into(),
            ..valid_form()
        };
        assert_eq!(
            form.into_new_order(Cart::new()).unwrap_err(),
            "City is required"
        );
    }

    #[test]
    fn test_bad_email_and_payment_method() {
        let form = CheckoutForm {
            customer_email: "not-an-email".into(),
            ..valid_form()
        };
        assert!(form.into_new_order(Cart::new()).unwrap_err().starts_with("Email"));

        let form = CheckoutForm {
            payment_method: "bitcoin".into(),
            ..valid_form()
        };
        assert_eq!(
            form.into_new_order(Cart::new()).unwrap_err(),
            "Choose a payment method"
        );
    }
}
