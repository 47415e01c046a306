//! Emporium Core - Shared domain library.
//!
//! This crate provides the domain types used across all Emporium components:
//! - `web` - Storefront, checkout and admin back-office server
//! - `cli` - Command-line tools for migrations, seeding and the admin allow-list
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure logic - no I/O, no
//! database access, no HTTP clients. Anything that needs a database (such as
//! the slug collision check) is expressed as a trait the web crate implements.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, prices, statuses and buckets
//! - [`slug`] - Slug normalisation and collision resolution
//! - [`cart`] - Per-session shopping cart state container

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod slug;
pub mod types;

pub use cart::{Cart, CartItem, CartLine, CurrentPrice};
pub use slug::{
    MAX_SLUG_ATTEMPTS, Slug, SlugError, SlugStore, SlugTable, UniqueSlugError, slugify,
    unique_slug,
};
pub use types::*;
