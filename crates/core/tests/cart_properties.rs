use emporium_core::{Cart, CartItem, ProductId};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn item(id: i32, cents: i64, discount: Option<i64>) -> CartItem {
    CartItem {
        product_id: ProductId::new(id),
        title: format!("Product {id}"),
        slug: format!("product-{id}"),
        image_url: None,
        price: Decimal::new(cents, 2),
        discount_price: discount.map(|d| Decimal::new(d, 2)),
    }
}

proptest! {
    #[test]
    fn prop_one_line_per_product(
        adds in proptest::collection::vec((0..5i32, 0..4u32), 0..50)
    ) {
        let mut cart = Cart::new();
        for (id, quantity) in &adds {
            cart.add(item(*id, 100, None), *quantity);
        }

        let mut ids = cart.product_ids();
        let len = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), len);

        let expected: u32 = (0..5i32)
            .map(|id| {
                let added: u32 = adds.iter().filter(|(i, _)| *i == id).map(|(_, q)| q).sum();
                added.min(Cart::MAX_LINE_QUANTITY)
            })
            .sum();
        prop_assert_eq!(cart.item_count(), expected);
    }

    #[test]
    fn prop_line_quantity_never_exceeds_cap(
        adds in proptest::collection::vec((0..3i32, any::<u32>()), 1..20),
        update in any::<u32>(),
    ) {
        let mut cart = Cart::new();
        for (id, quantity) in &adds {
            cart.add(item(*id, 100_000, None), *quantity);
        }
        if let Some(line) = cart.lines().first() {
            let id = line.item.product_id;
            cart.update_quantity(id, update);
        }

        for line in cart.lines() {
            prop_assert!(line.quantity <= Cart::MAX_LINE_QUANTITY);
            prop_assert!(i32::try_from(line.quantity).is_ok());
        }
        // 3 lines of 99 units at 1000.00 stay far below NUMERIC(12,2)
        prop_assert!(cart.total_price() < Decimal::new(1_000_000_000_000, 2));
    }

    #[test]
    fn prop_total_is_sum_of_effective_prices(
        lines in proptest::collection::vec(
            (1..100_000i64, proptest::option::of(1..100_000i64), 1..10u32),
            0..20,
        )
    ) {
        let mut cart = Cart::new();
        let mut expected = Decimal::ZERO;
        for (id, (price, discount, quantity)) in (0i32..).zip(&lines) {
            cart.add(item(id, *price, *discount), *quantity);
            expected += Decimal::new(discount.unwrap_or(*price), 2) * Decimal::from(*quantity);
        }
        prop_assert_eq!(cart.total_price(), expected);
    }

    #[test]
    fn prop_zero_quantity_update_removes(ids in proptest::collection::vec(0..10i32, 1..10)) {
        let mut cart = Cart::new();
        for id in &ids {
            cart.add(item(*id, 100, None), 1);
        }
        let target = ProductId::new(ids[0]);
        cart.update_quantity(target, 0);
        prop_assert!(!cart.product_ids().contains(&target));
    }
}
