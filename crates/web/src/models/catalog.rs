//! Categories and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use emporium_core::{CartItem, CategoryId, CurrentPrice, ProductId};

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A product listed in the storefront.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Link to an external shop page, shown instead of the add-to-cart form.
    pub external_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether a discount price is set and below the regular price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount_price.is_some_and(|discount| discount < self.price)
    }

    /// Price a customer pays for one unit.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Snapshot used when adding the product to a cart.
    #[must_use]
    pub fn cart_item(&self) -> CartItem {
        CartItem {
            product_id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
            discount_price: self.discount_price,
        }
    }

    /// Current catalogue values for repricing a cart.
    #[must_use]
    pub fn current_price(&self) -> CurrentPrice {
        CurrentPrice {
            product_id: self.id,
            title: self.title.clone(),
            price: self.price,
            discount_price: self.discount_price,
        }
    }
}
