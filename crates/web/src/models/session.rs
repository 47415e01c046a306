//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use emporium_core::{AuthUserId, Email};

/// Session-stored user identity.
///
/// Minimal data kept after a hosted sign-in. The access token is needed to
/// sign the user out of the hosted service again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Hosted auth user id.
    pub id: AuthUserId,
    /// User's email address.
    pub email: Email,
    /// Access token returned at sign-in.
    pub access_token: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart.
    pub const CART: &str = emporium_core::Cart::SESSION_KEY;

    /// Key for the id of the last order placed in this session.
    pub const LAST_ORDER_ID: &str = "last_order_id";
}
