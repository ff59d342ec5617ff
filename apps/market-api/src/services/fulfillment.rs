//! Order fulfillment.
//!
//! Sellers advance their orders through the closed status lifecycle. Two
//! checks gate every update: ownership (the order's product must belong to
//! the caller) and legality (the transition must be an edge of the
//! lifecycle table in `bazaar_core::lifecycle`).

use tracing::{debug, info};

use bazaar_core::{CoreError, Order, OrderStatus};
use bazaar_db::Database;

use crate::error::ApiError;

/// Seller-facing order status updates.
pub struct FulfillmentService {
    db: Database,
}

impl FulfillmentService {
    pub fn new(db: Database) -> Self {
        FulfillmentService { db }
    }

    /// Moves an order to `new_status` on behalf of `seller_id`.
    ///
    /// ## Errors
    /// * `OrderNotFound` - unknown order
    /// * `NotOwner` - the order's product belongs to another seller
    /// * `IllegalTransition` - the edge is not in the lifecycle table
    ///
    /// The write itself is guarded on the status the legality check ran
    /// against, so two racing updates cannot both apply.
    pub async fn update_status(
        &self,
        order_id: &str,
        seller_id: &str,
        new_status: OrderStatus,
    ) -> Result<Order, ApiError> {
        debug!(order_id = %order_id, seller_id = %seller_id, new_status = %new_status, "Fulfillment update");

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
            .map_err(ApiError::from)?;

        let product = self
            .db
            .products()
            .get_by_id(&order.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(order.product_id.clone()))
            .map_err(ApiError::from)?;

        if product.seller_id != seller_id {
            return Err(CoreError::NotOwner {
                order_id: order_id.to_string(),
                seller_id: seller_id.to_string(),
            }
            .into());
        }

        if !order.status.can_transition_to(new_status) {
            return Err(CoreError::IllegalTransition {
                order_id: order_id.to_string(),
                from: order.status,
                to: new_status,
            }
            .into());
        }

        let moved = self
            .db
            .orders()
            .transition_status(order_id, order.status, new_status)
            .await?;

        if !moved {
            // Lost a race: someone else moved the order first. Report the
            // conflict against the status that actually stands now.
            let fresh = self
                .db
                .orders()
                .get_by_id(order_id)
                .await?
                .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
                .map_err(ApiError::from)?;

            return Err(CoreError::IllegalTransition {
                order_id: order_id.to_string(),
                from: fresh.status,
                to: new_status,
            }
            .into());
        }

        info!(order_id = %order_id, from = %order.status, to = %new_status, "Order status updated");

        let updated = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
            .map_err(ApiError::from)?;

        Ok(updated)
    }

    /// Lists the orders against a seller's products, newest first.
    pub async fn seller_orders(&self, seller_id: &str) -> Result<Vec<Order>, ApiError> {
        Ok(self.db.orders().list_for_seller(seller_id).await?)
    }

    /// Lists a buyer's orders, newest first.
    ///
    /// ## Errors
    /// * `NoProfile` - the identity has no purchaser profile on file
    pub async fn customer_orders(&self, buyer_user_id: &str) -> Result<Vec<Order>, ApiError> {
        let customer = self
            .db
            .customers()
            .get_by_user_id(buyer_user_id)
            .await?
            .ok_or_else(|| CoreError::NoProfile(buyer_user_id.to_string()))
            .map_err(ApiError::from)?;

        Ok(self.db.orders().list_for_buyer(&customer.id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_core::{Customer, Product};
    use bazaar_db::{DbConfig, NewOrderLine};
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed(db: &Database) -> String {
        db.customers()
            .insert(&Customer {
                id: "c-1".to_string(),
                user_id: "user-1".to_string(),
                full_name: "Ada Buyer".to_string(),
                email: "ada@example.com".to_string(),
                shipping_address: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        db.products()
            .insert(&Product {
                id: "p-1".to_string(),
                seller_id: "seller-1".to_string(),
                name: "Product".to_string(),
                description: None,
                price_cents: 1000,
                stock_quantity: 5,
                order_count: 0,
                is_trending: false,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        let orders = db
            .orders()
            .create_from_cart(
                "c-1",
                &[NewOrderLine {
                    product_id: "p-1".to_string(),
                    quantity: 1,
                    selected_color: None,
                    selected_size: None,
                }],
            )
            .await
            .unwrap();

        orders[0].id.clone()
    }

    #[tokio::test]
    async fn test_owner_advances_through_lifecycle() {
        let db = test_db().await;
        let order_id = seed(&db).await;
        let service = FulfillmentService::new(db.clone());

        let order = service
            .update_status(&order_id, "seller-1", OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);

        let order = service
            .update_status(&order_id, "seller-1", OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);

        let order = service
            .update_status(&order_id, "seller-1", OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let db = test_db().await;
        let order_id = seed(&db).await;
        let service = FulfillmentService::new(db);

        let err = service
            .update_status(&order_id, "seller-2", OrderStatus::Processing)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_illegal_transition_rejected() {
        let db = test_db().await;
        let order_id = seed(&db).await;
        let service = FulfillmentService::new(db.clone());

        // Pending -> Delivered skips the lifecycle
        let err = service
            .update_status(&order_id, "seller-1", OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);

        // The order did not move
        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_terminal_orders_cannot_move() {
        let db = test_db().await;
        let order_id = seed(&db).await;
        let service = FulfillmentService::new(db);

        service
            .update_status(&order_id, "seller-1", OrderStatus::Cancelled)
            .await
            .unwrap();

        let err = service
            .update_status(&order_id, "seller-1", OrderStatus::Processing)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let db = test_db().await;
        seed(&db).await;
        let service = FulfillmentService::new(db);

        let err = service
            .update_status("ghost", "seller-1", OrderStatus::Processing)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_order_listings() {
        let db = test_db().await;
        seed(&db).await;
        let service = FulfillmentService::new(db);

        assert_eq!(service.seller_orders("seller-1").await.unwrap().len(), 1);
        assert!(service.seller_orders("seller-2").await.unwrap().is_empty());
        assert_eq!(service.customer_orders("user-1").await.unwrap().len(), 1);

        let err = service.customer_orders("user-ghost").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
