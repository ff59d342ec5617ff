//! Invoice rendering and the eligibility gate.
//!
//! The renderer is a pure function from a finalized payment (plus purchaser
//! identity) to document bytes. Rendering internals are an external concern;
//! the plain-text implementation here keeps the boundary honest. What this
//! module enforces is the gate: the renderer is NEVER invoked for a payment
//! that is not Success.

use std::sync::Arc;

use tracing::debug;

use bazaar_core::{CoreError, Customer, Payment};
use bazaar_db::Database;

use crate::error::ApiError;

// =============================================================================
// Renderer Seam
// =============================================================================

/// Pure document renderer: payment + purchaser identity → bytes.
///
/// Implementations must not mutate state or perform I/O.
pub trait InvoiceRenderer: Send + Sync {
    /// Renders an invoice document for a finalized payment.
    ///
    /// `purchaser` is the profile on file for the payer, when one exists;
    /// payments can be initialized by identities without a profile.
    fn generate_invoice(&self, payment: &Payment, purchaser: Option<&Customer>) -> Vec<u8>;
}

/// Plain-text renderer.
pub struct TextInvoiceRenderer;

impl InvoiceRenderer for TextInvoiceRenderer {
    fn generate_invoice(&self, payment: &Payment, purchaser: Option<&Customer>) -> Vec<u8> {
        let billed_to = match purchaser {
            Some(customer) => format!("{} <{}>", customer.full_name, customer.email),
            None => payment.email.clone(),
        };

        let document = format!(
            "INVOICE\n\
             =======\n\
             Reference:  {}\n\
             Billed to:  {}\n\
             Amount:     {} {}\n\
             Status:     {}\n\
             Issued for payment created {}\n",
            payment.tx_ref,
            billed_to,
            payment.amount(),
            payment.currency,
            payment.status,
            payment.created_at.to_rfc3339(),
        );

        document.into_bytes()
    }
}

// =============================================================================
// Invoice Service
// =============================================================================

/// Gates invoice issuance on payment status.
pub struct InvoiceService {
    db: Database,
    renderer: Arc<dyn InvoiceRenderer>,
}

impl InvoiceService {
    pub fn new(db: Database, renderer: Arc<dyn InvoiceRenderer>) -> Self {
        InvoiceService { db, renderer }
    }

    /// Renders the invoice for `tx_ref`, or refuses.
    ///
    /// ## Errors
    /// * `PaymentNotFound` - unknown reference
    /// * `InvoiceNotAvailable` - payment is Pending or Failed; the renderer
    ///   is not invoked
    pub async fn invoice(&self, tx_ref: &str) -> Result<Vec<u8>, ApiError> {
        let payment = self
            .db
            .payments()
            .get_by_tx_ref(tx_ref)
            .await?
            .ok_or_else(|| CoreError::PaymentNotFound(tx_ref.to_string()))
            .map_err(ApiError::from)?;

        if !payment.can_issue_invoice() {
            return Err(CoreError::InvoiceNotAvailable {
                tx_ref: tx_ref.to_string(),
                status: payment.status.to_string(),
            }
            .into());
        }

        let purchaser = self
            .db
            .customers()
            .get_by_user_id(&payment.user_id)
            .await?;

        debug!(tx_ref = %tx_ref, "Rendering invoice");
        Ok(self.renderer.generate_invoice(&payment, purchaser.as_ref()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
