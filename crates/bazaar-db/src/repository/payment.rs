//! # Payment Repository (Payment Ledger)
//!
//! Database operations for gateway payments.
//!
//! ## The CAS Transition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │          Pending → terminal, exactly once                               │
//! │                                                                         │
//! │  Two verify calls race for the same tx_ref:                             │
//! │                                                                         │
//! │  A: UPDATE ... WHERE tx_ref = :ref AND status = 'pending'  → 1 row     │
//! │  B: UPDATE ... WHERE tx_ref = :ref AND status = 'pending'  → 0 rows    │
//! │                                                                         │
//! │  Only the first caller to observe Pending performs the transition;     │
//! │  the second observes the now-terminal row and reports its stored       │
//! │  status. Terminal states never move again.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bazaar_core::{Payment, PaymentStatus};

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Inserts a freshly initialized payment (status Pending).
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - tx_ref already exists
    pub async fn insert(&self, payment: &Payment) -> DbResult<()> {
        debug!(tx_ref = %payment.tx_ref, amount = %payment.amount_cents, "Inserting payment");

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, tx_ref, amount_cents, currency,
                email, status, created_at, verified_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.user_id)
        .bind(&payment.tx_ref)
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(&payment.email)
        .bind(payment.status)
        .bind(payment.created_at)
        .bind(payment.verified_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a payment by its transaction reference.
    pub async fn get_by_tx_ref(&self, tx_ref: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT
                id, user_id, tx_ref, amount_cents, currency,
                email, status, created_at, verified_at
            FROM payments
            WHERE tx_ref = ?1
            "#,
        )
        .bind(tx_ref)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Moves a payment from Pending to a terminal status, compare-and-swap
    /// style (see module docs).
    ///
    /// ## Returns
    /// * `Ok(true)` - this caller performed the transition
    /// * `Ok(false)` - the payment was no longer Pending; the stored
    ///   terminal status stands
    pub async fn transition_from_pending(
        &self,
        tx_ref: &str,
        to: PaymentStatus,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = ?2,
                verified_at = ?3
            WHERE tx_ref = ?1 AND status = ?4
            "#,
        )
        .bind(tx_ref)
        .bind(to)
        .bind(now)
        .bind(PaymentStatus::Pending)
        .execute(&self.pool)
        .await?;

        let transitioned = result.rows_affected() > 0;
        debug!(tx_ref = %tx_ref, to = %to, transitioned, "Payment transition attempted");
        Ok(transitioned)
    }

    /// Lists payments stuck Pending since before `cutoff`, oldest first.
    ///
    /// Used by the stale-payment sweep; the sweep flags these for manual
    /// review and deliberately does not transition them.
    pub async fn list_stale_pending(&self, cutoff: DateTime<Utc>) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT
                id, user_id, tx_ref, amount_cents, currency,
                email, status, created_at, verified_at
            FROM payments
            WHERE status = ?1 AND created_at < ?2
            ORDER BY created_at
            "#,
        )
        .bind(PaymentStatus::Pending)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}

/// Generates a new payment ID.
pub fn generate_payment_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn test_payment(tx_ref: &str) -> Payment {
        Payment {
            id: generate_payment_id(),
            user_id: "user-1".to_string(),
            tx_ref: tx_ref.to_string(),
            amount_cents: 50_000,
            currency: "USD".to_string(),
            email: "buyer@example.com".to_string(),
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            verified_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_tx_ref() {
        let db = test_db().await;
        let repo = db.payments();

        repo.insert(&test_payment("TX-ab12cd34")).await.unwrap();

        let found = repo.get_by_tx_ref("TX-ab12cd34").await.unwrap().unwrap();
        assert_eq!(found.amount_cents, 50_000);
        assert_eq!(found.status, PaymentStatus::Pending);
        assert!(found.verified_at.is_none());

        assert!(repo.get_by_tx_ref("TX-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tx_ref_is_unique() {
        let db = test_db().await;
        let repo = db.payments();

        repo.insert(&test_payment("TX-dup")).await.unwrap();
        let err = repo.insert(&test_payment("TX-dup")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_transition_happens_exactly_once() {
        let db = test_db().await;
        let repo = db.payments();

        repo.insert(&test_payment("TX-1")).await.unwrap();

        let first = repo
            .transition_from_pending("TX-1", PaymentStatus::Success)
            .await
            .unwrap();
        assert!(first);

        // Second transition attempt loses the CAS: stored status stands
        let second = repo
            .transition_from_pending("TX-1", PaymentStatus::Failed)
            .await
            .unwrap();
        assert!(!second);

        let stored = repo.get_by_tx_ref("TX-1").await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Success);
        assert!(stored.verified_at.is_some());
    }

    #[tokio::test]
    async fn test_stale_pending_listing() {
        let db = test_db().await;
        let repo = db.payments();

        let mut old = test_payment("TX-old");
        old.created_at = Utc::now() - Duration::hours(2);
        repo.insert(&old).await.unwrap();

        repo.insert(&test_payment("TX-fresh")).await.unwrap();

        let mut settled = test_payment("TX-settled");
        settled.created_at = Utc::now() - Duration::hours(2);
        repo.insert(&settled).await.unwrap();
        repo.transition_from_pending("TX-settled", PaymentStatus::Success)
            .await
            .unwrap();

        let cutoff = Utc::now() - Duration::hours(1);
        let stale = repo.list_stale_pending(cutoff).await.unwrap();

        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].tx_ref, "TX-old");
    }
}
