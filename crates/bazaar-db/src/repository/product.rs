//! # Product Repository (Inventory Ledger)
//!
//! Database operations for products and their inventory counters.
//!
//! ## The Reservation UPDATE
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              How a Stock Reservation Stays Atomic                       │
//! │                                                                         │
//! │  ❌ WRONG: read-then-write (races under concurrent checkouts)          │
//! │     SELECT stock_quantity ...        ← both requests read 1            │
//! │     UPDATE ... SET stock = 0         ← both requests "succeed"         │
//! │                                                                         │
//! │  ✅ CORRECT: one guarded UPDATE                                        │
//! │     UPDATE products SET                                                 │
//! │         stock_quantity = stock_quantity - :qty,                         │
//! │         order_count    = order_count + :qty,                            │
//! │         is_trending    = CASE WHEN order_count + :qty >= 5              │
//! │                               THEN 1 ELSE is_trending END               │
//! │     WHERE id = :id AND stock_quantity >= :qty                           │
//! │                                                                         │
//! │  The WHERE clause is the availability check; SQLite's single-writer    │
//! │  lock serializes the statements, so the sum of successful decrements   │
//! │  can never drive stock below zero. rows_affected == 0 means rejected.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The trending latch rides in the same statement: `order_count` is
//! monotonic and `is_trending` flips exactly when the cumulative count first
//! reaches the threshold, then never flips back.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::{Product, TRENDING_THRESHOLD};

/// Repository for product database operations.
///
/// This is the only writer of `stock_quantity`, `order_count` and
/// `is_trending`. Restocking is out of scope: no method here ever
/// increases stock.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, seller_id, name, description, price_cents,
                stock_quantity, order_count, is_trending, is_active,
                created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, seller_id, name, description, price_cents,
                stock_quantity, order_count, is_trending, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.seller_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.order_count)
        .bind(product.is_trending)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomically reserves stock for an order line.
    ///
    /// One guarded UPDATE decrements `stock_quantity`, increments
    /// `order_count` and latches `is_trending`, all gated on
    /// `stock_quantity >= quantity` (see module docs).
    ///
    /// ## Returns
    /// * `Ok(new_stock)` - Reservation committed
    /// * `Err(DbError::OutOfStock)` - Not enough stock; nothing changed
    /// * `Err(DbError::NotFound)` - Unknown product
    pub async fn reserve_stock(&self, product_id: &str, quantity: i64) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        reserve_stock_with(&mut conn, product_id, quantity).await
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// The reservation UPDATE against an explicit connection.
///
/// Shared by [`ProductRepository::reserve_stock`] and the checkout
/// transaction in the order repository, so a multi-line cart reserves every
/// line inside one transaction.
pub(crate) async fn reserve_stock_with(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<i64> {
    debug!(product_id = %product_id, quantity = %quantity, "Reserving stock");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products SET
            stock_quantity = stock_quantity - ?2,
            order_count = order_count + ?2,
            is_trending = CASE WHEN order_count + ?2 >= ?3 THEN 1 ELSE is_trending END,
            updated_at = ?4
        WHERE id = ?1 AND stock_quantity >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(TRENDING_THRESHOLD)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // Rejected: distinguish "unknown product" from "not enough stock"
        let available: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?;

        return match available {
            Some(available) => Err(DbError::out_of_stock(product_id, available, quantity)),
            None => Err(DbError::not_found("Product", product_id)),
        };
    }

    let new_stock: i64 = sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;

    debug!(product_id = %product_id, new_stock = %new_stock, "Stock reserved");
    Ok(new_stock)
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn test_product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
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
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&test_product("p-1", 1000, 5)).await.unwrap();

        let found = repo.get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(found.price_cents, 1000);
        assert_eq!(found.stock_quantity, 5);
        assert!(!found.is_trending);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reserve_decrements_stock_and_counts_orders() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&test_product("p-7", 1000, 5)).await.unwrap();

        let new_stock = repo.reserve_stock("p-7", 2).await.unwrap();
        assert_eq!(new_stock, 3);

        let product = repo.get_by_id("p-7").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 3);
        assert_eq!(product.order_count, 2);
        assert!(!product.is_trending);
    }

    #[tokio::test]
    async fn test_reserve_rejects_when_stock_short() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&test_product("p-9", 1000, 0)).await.unwrap();

        let err = repo.reserve_stock("p-9", 1).await.unwrap_err();
        match err {
            DbError::OutOfStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, "p-9");
                assert_eq!(available, 0);
                assert_eq!(requested, 1);
            }
            other => panic!("expected OutOfStock, got {other:?}"),
        }

        // Nothing changed on the rejected row
        let product = repo.get_by_id("p-9").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 0);
        assert_eq!(product.order_count, 0);
    }

    #[tokio::test]
    async fn test_reserve_unknown_product_is_not_found() {
        let db = test_db().await;
        let repo = db.products();

        let err = repo.reserve_stock("ghost", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reservations_never_drive_stock_negative() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&test_product("p-1", 500, 3)).await.unwrap();

        // 3 units available, 4 one-unit requests: exactly one must fail
        let mut successes = 0;
        let mut failures = 0;
        for _ in 0..4 {
            match repo.reserve_stock("p-1", 1).await {
                Ok(_) => successes += 1,
                Err(DbError::OutOfStock { .. }) => failures += 1,
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }

        assert_eq!(successes, 3);
        assert_eq!(failures, 1);

        let product = repo.get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_trending_latches_on_fifth_unit() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&test_product("p-1", 500, 10)).await.unwrap();

        // Four units: not yet trending
        for _ in 0..4 {
            repo.reserve_stock("p-1", 1).await.unwrap();
        }
        let product = repo.get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(product.order_count, 4);
        assert!(!product.is_trending);

        // Fifth unit: flips, observable immediately after the commit
        repo.reserve_stock("p-1", 1).await.unwrap();
        let product = repo.get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(product.order_count, 5);
        assert!(product.is_trending);

        // And never reverts
        repo.reserve_stock("p-1", 1).await.unwrap();
        let product = repo.get_by_id("p-1").await.unwrap().unwrap();
        assert!(product.is_trending);
    }

    #[tokio::test]
    async fn test_trending_latches_when_threshold_crossed_in_one_reservation() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&test_product("p-1", 500, 10)).await.unwrap();

        repo.reserve_stock("p-1", 7).await.unwrap();
        let product = repo.get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(product.order_count, 7);
        assert!(product.is_trending);
    }
}
