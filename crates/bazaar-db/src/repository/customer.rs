//! # Customer Repository
//!
//! Database operations for purchaser profiles.
//!
//! Checkout looks the buyer up here first: identities without a profile on
//! file are rejected before any inventory effect.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bazaar_core::Customer;

/// Repository for customer profile operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer profile by the opaque identity reference.
    pub async fn get_by_user_id(&self, user_id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, user_id, full_name, email, shipping_address, created_at
            FROM customers
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer profile.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the identity already has a profile
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(user_id = %customer.user_id, "Inserting customer profile");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, user_id, full_name, email, shipping_address, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.user_id)
        .bind(&customer.full_name)
        .bind(&customer.email)
        .bind(&customer.shipping_address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Generates a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
