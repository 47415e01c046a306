//! Per-visitor shopping cart.
//!
//! The cart lives in the visitor's session and is never written to a table.
//! Lines keep a snapshot of the product (title, slug, image, prices) taken when
//! it was added so the cart page renders without a database round-trip.
//! [`Cart::reprice`] refreshes those snapshots before an order is placed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Snapshot of a product as shown in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
}

impl CartItem {
    /// Price charged per unit: the discount price when set.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }
}

/// One product in the cart and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: CartItem,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.item.unit_price() * Decimal::from(self.quantity)
    }
}

/// Current catalogue values for a product, used by [`Cart::reprice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPrice {
    pub product_id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
}

/// Ordered list of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Session key the cart is stored under.
    pub const SESSION_KEY: &'static str = "cart";

    /// Most units of one product a cart line can hold.
    pub const MAX_LINE_QUANTITY: u32 = 99;

    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of `item`.
    ///
    /// Adding a product already in the cart increments its quantity and
    /// refreshes the snapshot instead of creating a second line. A quantity of
    /// zero does nothing. The line is capped at [`Cart::MAX_LINE_QUANTITY`].
    pub fn add(&mut self, item: CartItem, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.line_mut(item.product_id) {
            line.quantity = line
                .quantity
                .saturating_add(quantity)
                .min(Self::MAX_LINE_QUANTITY);
            line.item = item;
            return;
        }
        self.lines.push(CartLine {
            item,
            quantity: quantity.min(Self::MAX_LINE_QUANTITY),
        });
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// A quantity below one removes the line and anything above
    /// [`Cart::MAX_LINE_QUANTITY`] is capped. Unknown products are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity.min(Self::MAX_LINE_QUANTITY);
        }
    }

    /// Remove a product's line, if present.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.item.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Sum of every line total.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Refresh titles and prices from the catalogue.
    ///
    /// Lines whose product is missing from `current` are dropped. Returns
    /// `true` if anything changed, so the caller can tell the visitor.
    pub fn reprice(&mut self, current: &[CurrentPrice]) -> bool {
        let before = self.lines.clone();

        self.lines.retain_mut(|line| {
            let Some(fresh) = current
                .iter()
                .find(|product| product.product_id == line.item.product_id)
            else {
                return false;
            };
            line.item.title.clone_from(&fresh.title);
            line.item.price = fresh.price;
            line.item.discount_price = fresh.discount_price;
            true
        });

        self.lines != before
    }

    /// Product ids in the cart, in line order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|line| line.item.product_id).collect()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.item.product_id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, price: i64, discount: Option<i64>) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            slug: format!("product-{id}"),
            image_url: None,
            price: Decimal::new(price, 2),
            discount_price: discount.map(|d| Decimal::new(d, 2)),
        }
    }

    #[test]
    fn test_add_same_product_increments_quantity() {
        let mut cart = Cart::new();
        cart.add(item(1, 1000, None), 1);
        cart.add(item(1, 1000, None), 2);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add(item(1, 1000, None), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(item(3, 100, None), 1);
        cart.add(item(1, 100, None), 1);
        cart.add(item(3, 100, None), 1);

        assert_eq!(cart.product_ids(), vec![ProductId::new(3), ProductId::new(1)]);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add(item(1, 1000, None), 2);
        cart.add(item(2, 500, None), 1);

        cart.update_quantity(ProductId::new(1), 0);
        assert_eq!(cart.product_ids(), vec![ProductId::new(2)]);

        cart.update_quantity(ProductId::new(2), 4);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_line_quantity_is_capped() {
        let mut cart = Cart::new();
        cart.add(item(1, 1000, None), 3_000_000_000);
        assert_eq!(cart.lines()[0].quantity, Cart::MAX_LINE_QUANTITY);

        cart.update_quantity(ProductId::new(1), 1);
        cart.add(item(1, 1000, None), u32::MAX);
        assert_eq!(cart.lines()[0].quantity, Cart::MAX_LINE_QUANTITY);

        cart.update_quantity(ProductId::new(1), 500);
        assert_eq!(cart.lines()[0].quantity, Cart::MAX_LINE_QUANTITY);
        assert_eq!(cart.total_price(), Decimal::new(99_000, 2));
    }

    #[test]
    fn test_update_unknown_product_is_ignored() {
        let mut cart = Cart::new();
        cart.update_quantity(ProductId::new(9), 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_uses_discount_when_present() {
        let mut cart = Cart::new();
        cart.add(item(1, 2000, Some(1500)), 2); // 30.00
        cart.add(item(2, 999, None), 1); // 9.99

        assert_eq!(cart.total_price(), Decimal::new(3999, 2));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(item(1, 100, None), 1);
        cart.add(item(2, 100, None), 1);

        cart.remove(ProductId::new(1));
        assert_eq!(cart.product_ids(), vec![ProductId::new(2)]);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_reprice_refreshes_and_drops_vanished() {
        let mut cart = Cart::new();
        cart.add(item(1, 1000, None), 1);
        cart.add(item(2, 500, None), 2);

        let current = [CurrentPrice {
            product_id: ProductId::new(2),
            title: "Renamed".to_owned(),
            price: Decimal::new(600, 2),
            discount_price: Some(Decimal::new(450, 2)),
        }];

        assert!(cart.reprice(&current));
        assert_eq!(cart.product_ids(), vec![ProductId::new(2)]);
        assert_eq!(cart.lines()[0].item.title, "Renamed");
        assert_eq!(cart.total_price(), Decimal::new(900, 2));
    }

    #[test]
    fn test_reprice_unchanged_returns_false() {
        let mut cart = Cart::new();
        cart.add(item(1, 1000, None), 1);

        let current = [CurrentPrice {
            product_id: ProductId::new(1),
            title: "Product 1".to_owned(),
            price: Decimal::new(1000, 2),
            discount_price: None,
        }];

        assert!(!cart.reprice(&current));
    }

    #[test]
    fn test_session_round_trip() {
        let mut cart = Cart::new();
        cart.add(item(7, 1250, Some(1000)), 2);

        let json = serde_json::to_value(&cart).unwrap();
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
