//! # Order Repository (Order Store)
//!
//! Database operations for orders, including the checkout transaction.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  All-or-Nothing Cart Commit                             │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    for each cart line:                                                  │
//! │      1. SELECT product        → unknown id? ──────────► ROLLBACK        │
//! │      2. reservation UPDATE    → stock short? ─────────► ROLLBACK        │
//! │      3. INSERT order (price frozen from step 1)                         │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A failure on line N undoes the reservations of lines 1..N-1: the      │
//! │  caller observes either every order created and every line reserved,   │
//! │  or zero side effects.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders are never deleted; after creation only `status`/`updated_at` move,
//! through the guarded transition UPDATE.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::reserve_stock_with;
use bazaar_core::{Order, OrderStatus};

/// A cart line prepared for the checkout transaction.
///
/// Customization fields are echoed onto the order verbatim; no validation
/// against the product's option set is performed.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                id, buyer_id, product_id, quantity,
                unit_price_cents, total_price_cents, status,
                selected_color, selected_size, order_date, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Commits a whole cart in one transaction.
    ///
    /// For each line: reserve stock (guarded UPDATE) and insert one order
    /// row with the product's current price frozen onto it. The first
    /// failure rolls back every earlier reservation and insert.
    ///
    /// ## Returns
    /// The created orders, in cart order.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - a line references an unknown product
    /// * `DbError::OutOfStock` - a line exceeds available stock
    pub async fn create_from_cart(
        &self,
        buyer_id: &str,
        lines: &[NewOrderLine],
    ) -> DbResult<Vec<Order>> {
        debug!(buyer_id = %buyer_id, lines = lines.len(), "Committing cart");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut orders = Vec::with_capacity(lines.len());

        for line in lines {
            // Price capture happens inside the transaction so the frozen
            // unit price is the same one the reservation ran against.
            let price_cents: Option<i64> =
                sqlx::query_scalar("SELECT price_cents FROM products WHERE id = ?1")
                    .bind(&line.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let unit_price_cents = price_cents
                .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;

            reserve_stock_with(&mut *tx, &line.product_id, line.quantity).await?;

            let order = Order {
                id: Uuid::new_v4().to_string(),
                buyer_id: buyer_id.to_string(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents,
                total_price_cents: unit_price_cents * line.quantity,
                status: OrderStatus::Pending,
                selected_color: line.selected_color.clone(),
                selected_size: line.selected_size.clone(),
                order_date: now,
                updated_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO orders (
                    id, buyer_id, product_id, quantity,
                    unit_price_cents, total_price_cents, status,
                    selected_color, selected_size, order_date, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(&order.id)
            .bind(&order.buyer_id)
            .bind(&order.product_id)
            .bind(order.quantity)
            .bind(order.unit_price_cents)
            .bind(order.total_price_cents)
            .bind(order.status)
            .bind(&order.selected_color)
            .bind(&order.selected_size)
            .bind(order.order_date)
            .bind(order.updated_at)
            .execute(&mut *tx)
            .await?;

            orders.push(order);
        }

        tx.commit().await?;

        debug!(buyer_id = %buyer_id, orders = orders.len(), "Cart committed");
        Ok(orders)
    }

    /// Moves an order's status with a guard on the expected current status.
    ///
    /// ## Returns
    /// * `Ok(true)` - transitioned
    /// * `Ok(false)` - the order was no longer in `from` (lost a race);
    ///   the caller should re-read and re-evaluate
    pub async fn transition_status(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(order_id)
        .bind(from)
        .bind(to)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a buyer's orders, newest first.
    pub async fn list_for_buyer(&self, buyer_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                id, buyer_id, product_id, quantity,
                unit_price_cents, total_price_cents, status,
                selected_color, selected_size, order_date, updated_at
            FROM orders
            WHERE buyer_id = ?1
            ORDER BY order_date DESC
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists the orders against a seller's products, newest first.
    pub async fn list_for_seller(&self, seller_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                o.id, o.buyer_id, o.product_id, o.quantity,
                o.unit_price_cents, o.total_price_cents, o.status,
                o.selected_color, o.selected_size, o.order_date, o.updated_at
            FROM orders o
            INNER JOIN products p ON p.id = o.product_id
            WHERE p.seller_id = ?1
            ORDER BY o.order_date DESC
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bazaar_core::Product;
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, id: &str, price_cents: i64, stock: i64) {
        db.products()
            .insert(&Product {
                id: id.to_string(),
                seller_id: "seller-1".to_string(),
                name: format!("Product {id}"),
                description: None,
                price_cents,
                stock_quantity: stock,
                order_count: 0,
                is_trending: false,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    async fn seed_customer(db: &Database, id: &str) {
        db.customers()
            .insert(&bazaar_core::Customer {
                id: id.to_string(),
                user_id: format!("user-{id}"),
                full_name: "Test Buyer".to_string(),
                email: "buyer@example.com".to_string(),
                shipping_address: Some("1 Market Street".to_string()),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    fn line(product_id: &str, quantity: i64) -> NewOrderLine {
        NewOrderLine {
            product_id: product_id.to_string(),
            quantity,
            selected_color: None,
            selected_size: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_creates_orders_with_frozen_prices() {
        let db = test_db().await;
        seed_customer(&db, "c-1").await;
        seed_product(&db, "p-7", 1000, 5).await;

        let orders = db
            .orders()
            .create_from_cart("c-1", &[line("p-7", 2)])
            .await
            .unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].unit_price_cents, 1000);
        assert_eq!(orders[0].total_price_cents, 2000);
        assert_eq!(orders[0].status, OrderStatus::Pending);

        let product = db.products().get_by_id("p-7").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 3);
        assert_eq!(product.order_count, 2);
        assert!(!product.is_trending);

        // Persisted, not just returned
        let stored = db.orders().get_by_id(&orders[0].id).await.unwrap().unwrap();
        assert_eq!(stored.total_price_cents, 2000);
    }

    #[tokio::test]
    async fn test_checkout_is_all_or_nothing() {
        let db = test_db().await;
        seed_customer(&db, "c-1").await;
        seed_product(&db, "p-1", 1000, 5).await;
        seed_product(&db, "p-9", 2000, 0).await;

        // Second line fails: the first line's reservation must roll back
        let err = db
            .orders()
            .create_from_cart("c-1", &[line("p-1", 2), line("p-9", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::OutOfStock { .. }));

        let p1 = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(p1.stock_quantity, 5);
        assert_eq!(p1.order_count, 0);

        let orders = db.orders().list_for_buyer("c-1").await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_rejects_unknown_product_with_no_side_effects() {
        let db = test_db().await;
        seed_customer(&db, "c-1").await;
        seed_product(&db, "p-1", 1000, 5).await;

        let err = db
            .orders()
            .create_from_cart("c-1", &[line("p-1", 1), line("ghost", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let p1 = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(p1.stock_quantity, 5);
    }

    #[tokio::test]
    async fn test_price_frozen_at_checkout_survives_catalog_change() {
        let db = test_db().await;
        seed_customer(&db, "c-1").await;
        seed_product(&db, "p-1", 1000, 5).await;

        let orders = db
            .orders()
            .create_from_cart("c-1", &[line("p-1", 1)])
            .await
            .unwrap();

        // Catalog price changes after purchase
        sqlx::query("UPDATE products SET price_cents = 9999 WHERE id = 'p-1'")
            .execute(db.pool())
            .await
            .unwrap();

        let stored = db.orders().get_by_id(&orders[0].id).await.unwrap().unwrap();
        assert_eq!(stored.unit_price_cents, 1000);
    }

    #[tokio::test]
    async fn test_transition_status_guards_on_current_status() {
        let db = test_db().await;
        seed_customer(&db, "c-1").await;
        seed_product(&db, "p-1", 1000, 5).await;

        let orders = db
            .orders()
            .create_from_cart("c-1", &[line("p-1", 1)])
            .await
            .unwrap();
        let order_id = &orders[0].id;

        // Pending -> Processing succeeds
        let moved = db
            .orders()
            .transition_status(order_id, OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap();
        assert!(moved);

        // A second Pending -> Processing observes the moved row and is a no-op
        let moved_again = db
            .orders()
            .transition_status(order_id, OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap();
        assert!(!moved_again);

        let stored = db.orders().get_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_list_for_seller_joins_through_products() {
        let db = test_db().await;
        seed_customer(&db, "c-1").await;
        seed_product(&db, "p-1", 1000, 5).await;

        db.orders()
            .create_from_cart("c-1", &[line("p-1", 1)])
            .await
            .unwrap();

        let for_seller = db.orders().list_for_seller("seller-1").await.unwrap();
        assert_eq!(for_seller.len(), 1);

        let for_other = db.orders().list_for_seller("seller-2").await.unwrap();
        assert!(for_other.is_empty());
    }
}
