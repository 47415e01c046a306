//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Storefront
//! GET  /                          - Home page
//! GET  /categories                - Category listing
//! GET  /categories/{slug}         - Category with its products
//! GET  /products?q=               - Product listing and search
//! GET  /products/{slug}           - Product detail
//! GET  /blog                      - Published posts
//! GET  /blog/{slug}               - Post detail
//!
//! # Cart and checkout (session)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add a product
//! POST /cart/update               - Change a quantity
//! POST /cart/remove               - Remove a product
//! POST /cart/clear                - Empty the cart
//! GET  /checkout                  - Checkout form
//! POST /checkout                  - Place the order
//! GET  /checkout/success/{id}     - Confirmation
//!
//! # Auth
//! GET  /login, POST /login        - Password sign-in (rate limited)
//! GET  /signup, POST /signup      - Sign-up (rate limited)
//! POST /logout                    - Sign out
//!
//! # Signed in
//! GET  /profile                   - Account and order history
//! GET  /notes, POST /notes        - Personal notes
//!
//! # Back-office (admin allow-list)
//! /admin/...                      - See `admin`
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod home;
pub mod layout;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

pub use layout::Layout;

/// Create the catalogue routes router.
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/categories/{slug}", get(catalog::category))
        .route("/products", get(catalog::products))
        .route("/products/{slug}", get(catalog::product))
}

/// Create the blog routes router.
fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/blog", get(blog::index))
        .route("/blog/{slug}", get(blog::show))
}

/// Create the cart and checkout routes router.
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/clear", post(cart::clear))
        .route("/checkout", get(checkout::form).post(checkout::place_order))
        .route("/checkout/success/{id}", get(checkout::success))
}

/// Create the auth routes router.
///
/// Only the credential-bearing POSTs are rate limited.
fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/signup", get(auth::signup_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create the signed-in account routes router.
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(account::profile))
        .route("/notes", get(account::notes).post(account::create_note))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(catalog_routes())
        .merge(blog_routes())
        .merge(cart_routes())
        .merge(auth_routes())
        .merge(account_routes())
        .nest("/admin", admin::routes())
}
