//! Orders placed at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use emporium_core::{
    Cart, Email, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
};

/// An order header.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order. Title and price are copied from the product when the
/// order is placed, so later catalogue edits do not rewrite history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the product has been deleted.
    pub product_id: Option<ProductId>,
    pub product_title: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Validated checkout input plus the repriced cart it pays for.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub cart: Cart,
}

/// Figures shown on the back-office dashboard.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct OrderStats {
    pub order_count: i64,
    pub pending_count: i64,
    /// Sum over orders that are not cancelled.
    pub revenue: Decimal,
}
