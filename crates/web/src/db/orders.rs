//! Order repository.

use sqlx::PgPool;

use emporium_core::{Email, OrderId, OrderStatus, PaymentStatus};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem, OrderStats};

const COLUMNS: &str = "id, customer_name, customer_email, customer_phone, shipping_address, \
                       shipping_city, shipping_postal_code, notes, payment_method, status, \
                       payment_status, total_amount, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_title, quantity, unit_price";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its items in one transaction.
    ///
    /// The order starts as `pending` / `unpaid`. Item titles and prices are
    /// copied from the cart, which the caller has repriced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the cart is empty.
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        if order.cart.is_empty() {
            return Err(RepositoryError::Conflict("cart is empty".to_owned()));
        }

        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders \
               (customer_name, customer_email, customer_phone, shipping_address, shipping_city, \
                shipping_postal_code, notes, payment_method, status, payment_status, total_amount) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        ))
        .bind(&order.customer_name)
        .bind(order.customer_email.as_str())
        .bind(&order.customer_phone)
        .bind(&order.shipping_address)
        .bind(&order.shipping_city)
        .bind(&order.shipping_postal_code)
        .bind(&order.notes)
        .bind(order.payment_method)
        .bind(OrderStatus::Pending)
        .bind(PaymentStatus::Unpaid)
        .bind(order.cart.total_price())
        .fetch_one(&mut *tx)
        .await?;

        for line in order.cart.lines() {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} out of range", line.quantity))
            })?;

            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, product_title, quantity, unit_price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(created.id)
            .bind(line.item.product_id)
            .bind(&line.item.title)
            .bind(quantity)
            .bind(line.item.unit_price())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Items of an order in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Orders newest first, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders \
             WHERE ($1::order_status IS NULL OR status = $1) \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Orders placed with an email address, compared case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_email(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE lower(customer_email) = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(email.normalized())
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Set the fulfilment and payment status of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        payment_status: PaymentStatus,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2, payment_status = $3, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(payment_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Order count, pending count and revenue of non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let stats = sqlx::query_as::<_, OrderStats>(
            "SELECT \
               COUNT(*) AS order_count, \
               COUNT(*) FILTER (WHERE status = 'pending') AS pending_count, \
               COALESCE(SUM(total_amount) FILTER (WHERE status <> 'cancelled'), 0) AS revenue \
             FROM orders",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
