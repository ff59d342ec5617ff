//! # Mock Gateway
//!
//! Scriptable in-memory [`PaymentGateway`] double for tests.
//!
//! Call counters make reconciliation policies pinnable: the idempotency
//! tests assert that verifying an already-terminal payment performs zero
//! further gateway queries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    GatewayError, GatewayResult, InitializeRequest, InitializedTransaction, PaymentGateway,
};

/// Scripted verify behavior.
#[derive(Debug, Clone)]
pub enum VerifyScript {
    /// Provider affirms settlement.
    Settled,
    /// Provider definitively answers non-success.
    Unsettled,
    /// Provider unreachable / non-2xx: no answer obtained.
    Unreachable,
}

/// Scriptable gateway double.
///
/// ## Usage
/// ```rust
/// use bazaar_gateway::MockGateway;
/// use bazaar_gateway::mock::VerifyScript;
///
/// let gateway = MockGateway::new();
/// gateway.script_verify(VerifyScript::Unsettled);
/// assert_eq!(gateway.verify_calls(), 0);
/// ```
pub struct MockGateway {
    verify_script: Mutex<VerifyScript>,
    reject_initialize: Mutex<bool>,
    initialize_calls: AtomicUsize,
    verify_calls: AtomicUsize,
}

impl MockGateway {
    /// A gateway that accepts initialization and affirms settlement.
    pub fn new() -> Self {
        MockGateway {
            verify_script: Mutex::new(VerifyScript::Settled),
            reject_initialize: Mutex::new(false),
            initialize_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
        }
    }

    /// Scripts the next verify answers.
    pub fn script_verify(&self, script: VerifyScript) {
        *self.verify_script.lock().expect("mock mutex poisoned") = script;
    }

    /// Makes initialization fail with a rejected request.
    pub fn reject_initialize(&self, reject: bool) {
        *self.reject_initialize.lock().expect("mock mutex poisoned") = reject;
    }

    /// How many times `initialize_transaction` was called.
    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    /// How many times `verify_transaction` was called.
    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initialize_transaction(
        &self,
        request: &InitializeRequest,
    ) -> GatewayResult<InitializedTransaction> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);

        if *self.reject_initialize.lock().expect("mock mutex poisoned") {
            return Err(GatewayError::Rejected {
                status: 401,
                message: "scripted rejection".to_string(),
            });
        }

        Ok(InitializedTransaction {
            checkout_url: format!("https://pay.example/checkout/{}", request.tx_ref),
        })
    }

    async fn verify_transaction(&self, _tx_ref: &str) -> GatewayResult<bool> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);

        let script = self.verify_script.lock().expect("mock mutex poisoned").clone();
        match script {
            VerifyScript::Settled => Ok(true),
            VerifyScript::Unsettled => Ok(false),
            VerifyScript::Unreachable => Err(GatewayError::Transport(
                "scripted transport failure".to_string(),
            )),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> InitializeRequest {
        InitializeRequest {
            tx_ref: "TX-ab12cd34".to_string(),
            amount_cents: 50_000,
            currency: "USD".to_string(),
            email: "buyer@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Buyer".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_counts_and_scripts() {
        let gateway = MockGateway::new();

        let initialized = gateway.initialize_transaction(&request()).await.unwrap();
        assert!(initialized.checkout_url.contains("TX-ab12cd34"));
        assert_eq!(gateway.initialize_calls(), 1);

        assert!(gateway.verify_transaction("TX-ab12cd34").await.unwrap());

        gateway.script_verify(VerifyScript::Unsettled);
        assert!(!gateway.verify_transaction("TX-ab12cd34").await.unwrap());

        gateway.script_verify(VerifyScript::Unreachable);
        assert!(gateway.verify_transaction("TX-ab12cd34").await.is_err());

        assert_eq!(gateway.verify_calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_scripted_initialize_rejection() {
        let gateway = MockGateway::new();
        gateway.reject_initialize(true);

        let err = gateway.initialize_transaction(&request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { status: 401, .. }));
    }
}
