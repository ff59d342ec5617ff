//! # HTTP Gateway Implementation
//!
//! Talks to the payment provider's REST API directly with reqwest - no
//! vendor SDK dependency.
//!
//! ## Endpoints
//! - `POST {base}/transaction/initialize` - open a hosted checkout session
//! - `GET  {base}/transaction/verify/{tx_ref}` - query settlement state
//!
//! Authentication is a bearer secret key on every request.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use bazaar_core::Money;

use crate::{
    GatewayError, GatewayResult, InitializeRequest, InitializedTransaction, PaymentGateway,
};

// =============================================================================
// Configuration
// =============================================================================

/// Settings for the HTTP gateway client.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Provider API base URL, without trailing slash.
    pub base_url: String,

    /// Secret key sent as a bearer token.
    pub secret_key: String,

    /// Where the provider redirects the buyer after settlement.
    pub return_url: String,

    /// Bound on every outbound request.
    ///
    /// When this elapses the caller gets `GatewayError::Timeout`, which is
    /// NOT an answer about the transaction.
    pub request_timeout: Duration,
}

// =============================================================================
// Wire Types
// =============================================================================

/// Provider response envelope: `{ "status": ..., "message": ..., "data": ... }`.
#[derive(Debug, Deserialize)]
struct ProviderEnvelope<T> {
    status: String,
    #[serde(default)]
    #[allow(dead_code)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    checkout_url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
}

// =============================================================================
// HTTP Gateway
// =============================================================================

/// Production [`PaymentGateway`] over the provider's REST API.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpPaymentGateway {
    /// Builds the client with the configured request timeout baked in.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(HttpPaymentGateway { client, config })
    }

    /// Formats integer cents as the provider's decimal amount string.
    fn wire_amount(cents: i64) -> String {
        Money::from_cents(cents).to_string()
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn initialize_transaction(
        &self,
        request: &InitializeRequest,
    ) -> GatewayResult<InitializedTransaction> {
        let url = format!("{}/transaction/initialize", self.config.base_url);

        debug!(tx_ref = %request.tx_ref, amount = %request.amount_cents, "Initializing gateway transaction");

        let payload = json!({
            "amount": Self::wire_amount(request.amount_cents),
            "currency": request.currency,
            "email": request.email,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "tx_ref": request.tx_ref,
            "return_url": self.config.return_url,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(tx_ref = %request.tx_ref, status = %status, "Gateway rejected initialization");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: ProviderEnvelope<InitializeData> = serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let data = envelope
            .data
            .ok_or_else(|| GatewayError::InvalidResponse("missing data object".to_string()))?;

        debug!(tx_ref = %request.tx_ref, "Gateway transaction initialized");
        Ok(InitializedTransaction {
            checkout_url: data.checkout_url,
        })
    }

    async fn verify_transaction(&self, tx_ref: &str) -> GatewayResult<bool> {
        let url = format!("{}/transaction/verify/{}", self.config.base_url, tx_ref);

        debug!(tx_ref = %tx_ref, "Verifying gateway transaction");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Non-2xx is NOT an answer about settlement, it is a failed query
        if !status.is_success() {
            warn!(tx_ref = %tx_ref, status = %status, "Gateway verify query rejected");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: ProviderEnvelope<VerifyData> = serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        // Only an affirmed success on both the envelope and the transaction
        // counts; any other definitive answer is non-success.
        let settled = envelope.status == "success"
            && envelope
                .data
                .map(|d| d.status == "success")
                .unwrap_or(false);

        debug!(tx_ref = %tx_ref, settled, "Gateway verify answered");
        Ok(settled)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_amount_formatting() {
        assert_eq!(HttpPaymentGateway::wire_amount(50_000), "500.00");
        assert_eq!(HttpPaymentGateway::wire_amount(1099), "10.99");
        assert_eq!(HttpPaymentGateway::wire_amount(5), "0.05");
    }

    #[test]
    fn test_envelope_parsing_success_answer() {
        let body = r#"{"status":"success","message":"ok","data":{"status":"success"}}"#;
        let envelope: ProviderEnvelope<VerifyData> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.status, "success");
        assert_eq!(envelope.data.unwrap().status, "success");
    }

    #[test]
    fn test_envelope_parsing_unsettled_answer() {
        let body = r#"{"status":"success","message":"ok","data":{"status":"pending"}}"#;
        let envelope: ProviderEnvelope<VerifyData> = serde_json::from_str(body).unwrap();
        // Definitive answer, but not a success: maps to Ok(false) upstream
        assert_eq!(envelope.data.unwrap().status, "pending");
    }

    #[test]
    fn test_envelope_parsing_tolerates_missing_message() {
        let body = r#"{"status":"success","data":{"checkout_url":"https://pay.example/abc"}}"#;
        let envelope: ProviderEnvelope<InitializeData> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.unwrap().checkout_url, "https://pay.example/abc");
    }
}
