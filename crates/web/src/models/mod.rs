//! Domain models for the storefront and back-office.
//!
//! Rows are read with `sqlx::query_as` straight into these structs except where
//! a column needs validation on the way out (see `db::admin_users`).

pub mod admin_user;
pub mod blog;
pub mod catalog;
pub mod note;
pub mod order;
pub mod session;

pub use admin_user::AdminUser;
pub use blog::BlogPost;
pub use catalog::{Category, Product};
pub use note::Note;
pub use order::{NewOrder, Order, OrderItem, OrderStats};
pub use session::CurrentUser;
