//! Payment initialization and reconciliation.
//!
//! ## The Reconciliation State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  initialize ──► gateway opens transaction ──► Payment row (Pending)    │
//! │                                                     │                   │
//! │                 buyer settles on the hosted page    │                   │
//! │                                                     ▼                   │
//! │  verify(tx_ref) ──► already terminal? ──► return stored status,         │
//! │                     │                     ZERO gateway calls            │
//! │                     ▼                                                   │
//! │                 ask the gateway                                         │
//! │                     ├── affirmed success ────► CAS to Success           │
//! │                     ├── affirmed non-success ► CAS to Failed            │
//! │                     └── no answer ───────────► error out, stay Pending  │
//! │                                                                         │
//! │  The CAS loser reads back whatever terminal status won the race.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Initialization deliberately tolerates a local insert failure after the
//! gateway call succeeded: the remote transaction already exists, so the
//! buyer still gets their checkout URL and the miss is logged loudly.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};

use bazaar_core::{
    generate_tx_ref, validation, CoreError, Payment, PaymentStatus,
};
use bazaar_db::repository::payment::generate_payment_id;
use bazaar_db::Database;
use bazaar_gateway::{InitializeRequest, PaymentGateway};

use crate::error::ApiError;

/// What a successful initialization hands back.
#[derive(Debug, Clone)]
pub struct InitializedPayment {
    /// Hosted page the buyer is redirected to for settlement.
    pub checkout_url: String,
    /// The reference to verify with after redirect.
    pub tx_ref: String,
}

/// Details for initializing a payment.
#[derive(Debug, Clone)]
pub struct InitializeDetails {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub amount_cents: i64,
}

/// Drives payments through initialize → verify against the gateway.
pub struct PaymentService {
    db: Database,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    pending_max_age_secs: i64,
}

impl PaymentService {
    pub fn new(
        db: Database,
        gateway: Arc<dyn PaymentGateway>,
        currency: String,
        pending_max_age_secs: i64,
    ) -> Self {
        PaymentService {
            db,
            gateway,
            currency,
            pending_max_age_secs,
        }
    }

    /// Opens a gateway transaction and records it locally as Pending.
    ///
    /// Call order matters:
    /// 1. Gateway first - if it fails, NO local row is created.
    /// 2. Local insert second - if it fails, the checkout URL is still
    ///    returned and the miss logged (the remote transaction exists;
    ///    blocking a real payment attempt over a transient local write
    ///    would be worse).
    pub async fn initialize(
        &self,
        details: InitializeDetails,
    ) -> Result<InitializedPayment, ApiError> {
        validation::validate_payment_amount(details.amount_cents).map_err(CoreError::from)?;
        validation::validate_email(&details.email).map_err(CoreError::from)?;

        let tx_ref = generate_tx_ref();
        debug!(tx_ref = %tx_ref, amount = %details.amount_cents, "Initializing payment");

        let initialized = self
            .gateway
            .initialize_transaction(&InitializeRequest {
                tx_ref: tx_ref.clone(),
                amount_cents: details.amount_cents,
                currency: self.currency.clone(),
                email: details.email.clone(),
                first_name: details.first_name.clone(),
                last_name: details.last_name.clone(),
            })
            .await?;

        let payment = Payment {
            id: generate_payment_id(),
            user_id: details.user_id,
            tx_ref: tx_ref.clone(),
            amount_cents: details.amount_cents,
            currency: self.currency.clone(),
            email: details.email,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            verified_at: None,
        };

        if let Err(e) = self.db.payments().insert(&payment).await {
            error!(
                tx_ref = %tx_ref,
                error = %e,
                "Pending payment row could not be persisted; returning checkout URL anyway"
            );
        } else {
            info!(tx_ref = %tx_ref, "Payment initialized");
        }

        Ok(InitializedPayment {
            checkout_url: initialized.checkout_url,
            tx_ref,
        })
    }

    /// Reconciles a payment against the gateway's authoritative answer.
    ///
    /// Idempotent: a payment already in a terminal state returns its stored
    /// status without any gateway call. A Pending payment transitions only
    /// on a definitive gateway answer; transport failures leave it Pending
    /// and surface as retryable errors.
    pub async fn verify(&self, tx_ref: &str) -> Result<PaymentStatus, ApiError> {
        validation::validate_tx_ref(tx_ref).map_err(CoreError::from)?;

        let payment = self
            .db
            .payments()
            .get_by_tx_ref(tx_ref)
            .await?
            .ok_or_else(|| CoreError::PaymentNotFound(tx_ref.to_string()))
            .map_err(ApiError::from)?;

        if payment.status.is_terminal() {
            debug!(tx_ref = %tx_ref, status = %payment.status, "Already terminal; skipping gateway");
            return Ok(payment.status);
        }

        let settled = self.gateway.verify_transaction(tx_ref).await?;
        let target = PaymentStatus::from_gateway_answer(settled);

        let transitioned = self
            .db
            .payments()
            .transition_from_pending(tx_ref, target)
            .await?;

        if transitioned {
            info!(tx_ref = %tx_ref, status = %target, "Payment reconciled");
            return Ok(target);
        }

        // Lost the CAS: another verifier settled this payment first. The
        // stored terminal status is the answer.
        let fresh = self
            .db
            .payments()
            .get_by_tx_ref(tx_ref)
            .await?
            .ok_or_else(|| CoreError::PaymentNotFound(tx_ref.to_string()))
            .map_err(ApiError::from)?;

        debug!(tx_ref = %tx_ref, status = %fresh.status, "Lost reconciliation race");
        Ok(fresh.status)
    }

    /// Flags payments stuck Pending beyond the configured age.
    ///
    /// Deliberately does NOT transition them: a payment abandoned
    /// mid-redirect may still settle, so reclassification is an operator
    /// decision. Returns how many were flagged.
    pub async fn sweep_stale_pending(&self) -> Result<usize, ApiError> {
        let cutoff = Utc::now() - Duration::seconds(self.pending_max_age_secs);
        let stale = self.db.payments().list_stale_pending(cutoff).await?;

        for payment in &stale {
            warn!(
                tx_ref = %payment.tx_ref,
                created_at = %payment.created_at,
                amount = %payment.amount_cents,
                "Payment stuck Pending beyond the review threshold; flagging for manual review"
            );
        }

        if !stale.is_empty() {
            info!(count = stale.len(), "Stale-payment sweep flagged payments");
        }

        Ok(stale.len())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_db::DbConfig;
    use bazaar_gateway::mock::VerifyScript;
    use bazaar_gateway::MockGateway;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn service(db: &Database, gateway: Arc<MockGateway>) -> PaymentService {
        PaymentService::new(db.clone(), gateway, "USD".to_string(), 1800)
    }

    fn details(amount_cents: i64) -> InitializeDetails {
        InitializeDetails {
            user_id: "user-1".to_string(),
            email: "buyer@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Buyer".to_string(),
            amount_cents,
        }
    }

    #[tokio::test]
    async fn test_initialize_persists_pending_payment() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        let service = service(&db, gateway.clone());

        let initialized = service.initialize(details(50_000)).await.unwrap();
        assert!(initialized.tx_ref.starts_with("TX-"));
        assert!(initialized.checkout_url.contains(&initialized.tx_ref));
        assert_eq!(gateway.initialize_calls(), 1);

        let stored = db
            .payments()
            .get_by_tx_ref(&initialized.tx_ref)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(stored.amount_cents, 50_000);
        assert_eq!(stored.currency, "USD");
    }

    #[tokio::test]
    async fn test_initialize_rejects_non_positive_amounts() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        let service = service(&db, gateway.clone());

        for amount in [0, -500] {
            let err = service.initialize(details(amount)).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }

        // Rejected before the gateway was ever involved
        assert_eq!(gateway.initialize_calls(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_creates_no_payment_row() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        gateway.reject_initialize(true);
        let service = service(&db, gateway);

        let err = service.initialize(details(50_000)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::GatewayError);

        // No local state was corrupted
        let stale = db
            .payments()
            .list_stale_pending(Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        assert!(stale.is_empty());
    }

    #[tokio::test]
    async fn test_local_persistence_failure_still_returns_checkout_url() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        let service = service(&db, gateway);

        // The remote transaction exists by the time the local insert runs;
        // a dead pool must not fail the payment attempt
        db.close().await;

        let initialized = service.initialize(details(50_000)).await.unwrap();
        assert!(initialized.checkout_url.contains(&initialized.tx_ref));
    }

    #[tokio::test]
    async fn test_verify_unsettled_transaction_fails_payment() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        gateway.script_verify(VerifyScript::Unsettled);
        let service = service(&db, gateway);

        let initialized = service.initialize(details(50_000)).await.unwrap();
        let status = service.verify(&initialized.tx_ref).await.unwrap();
        assert_eq!(status, PaymentStatus::Failed);

        let stored = db
            .payments()
            .get_by_tx_ref(&initialized.tx_ref)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, PaymentStatus::Failed);
        assert!(stored.verified_at.is_some());
    }

    #[tokio::test]
    async fn test_verify_settled_transaction_succeeds_payment() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        let service = service(&db, gateway);

        let initialized = service.initialize(details(50_000)).await.unwrap();
        let status = service.verify(&initialized.tx_ref).await.unwrap();
        assert_eq!(status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn test_verify_is_idempotent_with_zero_extra_gateway_calls() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        let service = service(&db, gateway.clone());

        let initialized = service.initialize(details(50_000)).await.unwrap();

        let first = service.verify(&initialized.tx_ref).await.unwrap();
        assert_eq!(first, PaymentStatus::Success);
        assert_eq!(gateway.verify_calls(), 1);

        // Terminal payments answer from the ledger, not the gateway -
        // even if the gateway would now answer differently
        gateway.script_verify(VerifyScript::Unsettled);
        let second = service.verify(&initialized.tx_ref).await.unwrap();
        assert_eq!(second, PaymentStatus::Success);
        assert_eq!(gateway.verify_calls(), 1);
    }

    #[tokio::test]
    async fn test_verify_transport_failure_leaves_payment_pending() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        let service = service(&db, gateway.clone());

        let initialized = service.initialize(details(50_000)).await.unwrap();

        gateway.script_verify(VerifyScript::Unreachable);
        let err = service.verify(&initialized.tx_ref).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::GatewayError);

        // No answer means no transition: still Pending, retryable
        let stored = db
            .payments()
            .get_by_tx_ref(&initialized.tx_ref)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);

        // Once the gateway answers, reconciliation proceeds
        gateway.script_verify(VerifyScript::Settled);
        let status = service.verify(&initialized.tx_ref).await.unwrap();
        assert_eq!(status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn test_verify_unknown_reference_is_not_found() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        let service = service(&db, gateway);

        let err = service.verify("TX-ghost").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_sweep_flags_only_old_pending_payments() {
        let db = test_db().await;
        let gateway = Arc::new(MockGateway::new());
        // 0-second threshold: every Pending payment is immediately stale
        let service = PaymentService::new(db.clone(), gateway, "USD".to_string(), 0);

        let initialized = service.initialize(details(50_000)).await.unwrap();

        // Give the row a created_at strictly before the sweep's cutoff
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let flagged = service.sweep_stale_pending().await.unwrap();
        assert_eq!(flagged, 1);

        // Sweep flags, it does not transition
        let stored = db
            .payments()
            .get_by_tx_ref(&initialized.tx_ref)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);

        // Settled payments are never flagged
        service.verify(&initialized.tx_ref).await.unwrap();
        let flagged = service.sweep_stale_pending().await.unwrap();
        assert_eq!(flagged, 0);
    }
}
