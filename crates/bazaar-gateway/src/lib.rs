//! # bazaar-gateway: Payment Gateway Adapter
//!
//! The seam between the marketplace and the remote payment provider.
//!
//! ## Trust Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Gateway Answers, Classified                             │
//! │                                                                         │
//! │  market-api ──► PaymentGateway::verify_transaction(tx_ref)             │
//! │                        │                                                │
//! │        ┌───────────────┼────────────────────┐                           │
//! │        ▼               ▼                    ▼                           │
//! │   Ok(true)         Ok(false)            Err(GatewayError)               │
//! │   affirmed         affirmed             timeout / transport /           │
//! │   success          non-success          non-2xx / bad body             │
//! │        │               │                    │                           │
//! │        ▼               ▼                    ▼                           │
//! │   Payment →        Payment →            NO local transition,            │
//! │   Success          Failed               caller retries later            │
//! │                                                                         │
//! │  A transport problem is never an answer. Only a definitive 2xx body    │
//! │  moves local payment state.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`http`] - reqwest implementation against the provider's REST API
//! - [`mock`] - scriptable in-memory double for tests

pub mod http;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

pub use http::{GatewayConfig, HttpPaymentGateway};
pub use mock::MockGateway;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Everything the provider needs to open a hosted checkout session.
///
/// `amount_cents` is converted to the provider's decimal wire format at the
/// HTTP boundary; inside the process money stays integer cents.
#[derive(Debug, Clone)]
pub struct InitializeRequest {
    /// Client-generated unique reference correlating local and remote state.
    pub tx_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A successfully opened remote transaction.
#[derive(Debug, Clone)]
pub struct InitializedTransaction {
    /// Hosted page the buyer is redirected to for settlement.
    pub checkout_url: String,
}

// =============================================================================
// Gateway Error
// =============================================================================

/// Failures talking to the remote payment provider.
///
/// All variants are retryable from the caller's perspective: none of them
/// implies anything about the remote transaction's settlement state.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The provider answered with a non-2xx status.
    #[error("Gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The bounded request timeout elapsed.
    ///
    /// Distinct from `Rejected`: the caller knows nothing about whether the
    /// provider received the request.
    #[error("Gateway request timed out")]
    Timeout,

    /// Connection-level failure (DNS, TLS, refused, reset).
    #[error("Gateway transport error: {0}")]
    Transport(String),

    /// A 2xx answer whose body could not be understood.
    #[error("Gateway returned an unparseable response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

// =============================================================================
// The Gateway Seam
// =============================================================================

/// The payment provider boundary.
///
/// `market-api` only ever sees this trait; production wires
/// [`HttpPaymentGateway`], tests wire [`MockGateway`].
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a remote transaction and returns the hosted checkout URL.
    async fn initialize_transaction(
        &self,
        request: &InitializeRequest,
    ) -> GatewayResult<InitializedTransaction>;

    /// Asks the provider for the authoritative settlement state of `tx_ref`.
    ///
    /// ## Returns
    /// * `Ok(true)` - the provider affirmed settlement
    /// * `Ok(false)` - the provider definitively answered non-success
    /// * `Err(_)` - no answer was obtained; settlement state is unknown
    async fn verify_transaction(&self, tx_ref: &str) -> GatewayResult<bool>;
}
