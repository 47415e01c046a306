//! Data shared by every storefront page.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use emporium_core::Cart;

use crate::models::{CurrentUser, session::keys};

/// Header state: who is signed in and how full the cart is.
///
/// Extracted from the session; a missing session renders as an anonymous
/// visitor with an empty cart.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user_email: Option<String>,
    pub cart_count: u32,
}

impl<S> FromRequestParts<S> for Layout
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self::default());
        };

        let user_email = session
            .get::<CurrentUser>(keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .map(|user| user.email.into_inner());

        let cart_count = session
            .get::<Cart>(keys::CART)
            .await
            .ok()
            .flatten()
            .map_or(0, |cart| cart.item_count());

        Ok(Self {
            user_email,
            cart_count,
        })
    }
}
