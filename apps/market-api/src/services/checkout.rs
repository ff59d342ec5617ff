//! Checkout orchestration.
//!
//! The only writer path that turns a cart into orders.
//!
//! ## Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Sequence                                │
//! │                                                                         │
//! │  1. Validate the cart (empty? malformed lines?)      → no side effects │
//! │  2. Resolve the buyer's purchaser profile            → no side effects │
//! │  3. Commit the cart in ONE transaction:                                 │
//! │       reserve every line + insert every order                           │
//! │       any failure rolls the whole cart back                             │
//! │  4. Best-effort order confirmation notification                         │
//! │                                                                         │
//! │  Steps 1-2 reject synchronously; step 3 is all-or-nothing; step 4      │
//! │  can never fail the checkout.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use bazaar_core::{validation, CartLine, CoreError, Money, Order};
use bazaar_db::{Database, NewOrderLine};

use crate::error::ApiError;
use crate::services::notify::{notify_best_effort, NotificationSender};

/// What a successful checkout hands back.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// One order per cart line, in cart order.
    pub orders: Vec<Order>,
    /// Sum of the orders' frozen line totals.
    pub total_cents: i64,
}

/// Orchestrates cart validation, the checkout transaction and the
/// confirmation notification.
pub struct CheckoutService {
    db: Database,
    notifier: Arc<dyn NotificationSender>,
}

impl CheckoutService {
    pub fn new(db: Database, notifier: Arc<dyn NotificationSender>) -> Self {
        CheckoutService { db, notifier }
    }

    /// Converts a cart into persisted orders with inventory effects.
    ///
    /// ## Errors
    /// * `EmptyCart` - no lines submitted
    /// * `Validation` - malformed line (bad quantity, blank product id)
    /// * `NoProfile` - the identity has no purchaser profile on file
    /// * `NotFound` - a line references an unknown product
    /// * `InsufficientStock` - a line exceeds available stock
    ///
    /// On any error the database is untouched: the cart commits atomically
    /// or not at all.
    pub async fn checkout(
        &self,
        buyer_user_id: &str,
        lines: &[CartLine],
    ) -> Result<CheckoutOutcome, ApiError> {
        debug!(buyer = %buyer_user_id, lines = lines.len(), "Checkout requested");

        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        validation::validate_cart_lines(lines).map_err(CoreError::from)?;

        let customer = self
            .db
            .customers()
            .get_by_user_id(buyer_user_id)
            .await?
            .ok_or_else(|| CoreError::NoProfile(buyer_user_id.to_string()))
            .map_err(ApiError::from)?;

        let order_lines: Vec<NewOrderLine> = lines
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                selected_color: line.color.clone(),
                selected_size: line.size.clone(),
            })
            .collect();

        let orders = self
            .db
            .orders()
            .create_from_cart(&customer.id, &order_lines)
            .await?;

        let total_cents: i64 = orders.iter().map(|o| o.total_price_cents).sum();

        info!(
            buyer = %buyer_user_id,
            orders = orders.len(),
            total = %Money::from_cents(total_cents),
            "Checkout committed"
        );

        let body = format!(
            "Thank you for your purchase! {} order(s) totalling {} were placed.",
            orders.len(),
            Money::from_cents(total_cents)
        );
        notify_best_effort(&*self.notifier, &customer.email, "Order confirmation", &body).await;

        Ok(CheckoutOutcome {
            orders,
            total_cents,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::notify::test_support::RecordingSender;
    use bazaar_core::{Customer, OrderStatus, Product};
    use bazaar_db::DbConfig;
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, user_id: &str) {
        db.customers()
            .insert(&Customer {
                id: format!("c-{user_id}"),
                user_id: user_id.to_string(),
                full_name: "Ada Buyer".to_string(),
                email: "ada@example.com".to_string(),
                shipping_address: Some("1 Market Street".to_string()),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
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

    fn line(product_id: &str, quantity: i64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            quantity,
            color: None,
            size: None,
        }
    }

    fn service(db: &Database) -> (CheckoutService, Arc<RecordingSender>) {
        let sender = Arc::new(RecordingSender::new());
        (
            CheckoutService::new(db.clone(), sender.clone()),
            sender,
        )
    }

    #[tokio::test]
    async fn test_single_line_checkout() {
        let db = test_db().await;
        seed_customer(&db, "user-1").await;
        seed_product(&db, "p-7", 1000, 5).await;
        let (service, sender) = service(&db);

        let outcome = service.checkout("user-1", &[line("p-7", 2)]).await.unwrap();

        assert_eq!(outcome.orders.len(), 1);
        assert_eq!(outcome.total_cents, 2000);
        assert_eq!(outcome.orders[0].status, OrderStatus::Pending);

        let product = db.products().get_by_id("p-7").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 3);
        assert_eq!(product.order_count, 2);
        assert!(!product.is_trending);

        // Confirmation went out to the profile's email
        assert_eq!(sender.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_without_side_effects() {
        let db = test_db().await;
        seed_customer(&db, "user-1").await;
        let (service, sender) = service(&db);

        let err = service.checkout("user-1", &[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(sender.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_no_profile_rejected_before_any_reservation() {
        let db = test_db().await;
        seed_product(&db, "p-1", 1000, 5).await;
        let (service, _) = service(&db);

        let err = service
            .checkout("user-unknown", &[line("p-1", 1)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let product = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 5);
    }

    #[tokio::test]
    async fn test_out_of_stock_line_rejects_whole_cart() {
        let db = test_db().await;
        seed_customer(&db, "user-1").await;
        seed_product(&db, "p-1", 1000, 5).await;
        seed_product(&db, "p-9", 2000, 0).await;
        let (service, sender) = service(&db);

        let err = service
            .checkout("user-1", &[line("p-1", 2), line("p-9", 1)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        // Zero side effects: first line's reservation rolled back, no orders,
        // no notification
        let p1 = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(p1.stock_quantity, 5);
        assert_eq!(p1.order_count, 0);
        assert!(db.orders().list_for_buyer("c-user-1").await.unwrap().is_empty());
        assert_eq!(sender.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = test_db().await;
        seed_customer(&db, "user-1").await;
        let (service, _) = service(&db);

        let err = service
            .checkout("user-1", &[line("ghost", 1)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected() {
        let db = test_db().await;
        seed_customer(&db, "user-1").await;
        seed_product(&db, "p-1", 1000, 5).await;
        let (service, _) = service(&db);

        let err = service.checkout("user-1", &[line("p-1", 0)]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = service.checkout("user-1", &[line("p-1", -2)]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_customization_echoed_verbatim() {
        let db = test_db().await;
        seed_customer(&db, "user-1").await;
        seed_product(&db, "p-1", 1000, 5).await;
        let (service, _) = service(&db);

        let mut cart_line = line("p-1", 1);
        cart_line.color = Some("indigo".to_string());
        cart_line.size = Some("XL".to_string());

        let outcome = service.checkout("user-1", &[cart_line]).await.unwrap();
        assert_eq!(outcome.orders[0].selected_color.as_deref(), Some("indigo"));
        assert_eq!(outcome.orders[0].selected_size.as_deref(), Some("XL"));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_checkout() {
        let db = test_db().await;
        seed_customer(&db, "user-1").await;
        seed_product(&db, "p-1", 1000, 5).await;

        let sender = Arc::new(RecordingSender::failing());
        let service = CheckoutService::new(db.clone(), sender);

        let outcome = service.checkout("user-1", &[line("p-1", 1)]).await.unwrap();
        assert_eq!(outcome.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_five_orders_flip_trending_on_the_fifth() {
        let db = test_db().await;
        seed_customer(&db, "user-1").await;
        seed_product(&db, "p-1", 1000, 10).await;
        let (service, _) = service(&db);

        for expected_count in 1..=4 {
            service.checkout("user-1", &[line("p-1", 1)]).await.unwrap();
            let product = db.products().get_by_id("p-1").await.unwrap().unwrap();
            assert_eq!(product.order_count, expected_count);
            assert!(!product.is_trending, "after {expected_count} orders");
        }

        service.checkout("user-1", &[line("p-1", 1)]).await.unwrap();
        let product = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(product.order_count, 5);
        assert!(product.is_trending);
    }

    #[tokio::test]
    async fn test_multi_line_cart_totals() {
        let db = test_db().await;
        seed_customer(&db, "user-1").await;
        seed_product(&db, "p-1", 1000, 5).await;
        seed_product(&db, "p-2", 250, 8).await;
        let (service, _) = service(&db);

        let outcome = service
            .checkout("user-1", &[line("p-1", 2), line("p-2", 4)])
            .await
            .unwrap();

        assert_eq!(outcome.orders.len(), 2);
        assert_eq!(outcome.total_cents, 2000 + 1000);
    }
}
