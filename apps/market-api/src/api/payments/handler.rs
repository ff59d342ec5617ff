//! Payment API handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use bazaar_core::PaymentStatus;

use crate::error::ApiError;
use crate::services::{InitializeDetails, InvoiceService, PaymentService};
use crate::AppState;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentRequest {
    /// Opaque identity reference of the payer.
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub amount_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentResponse {
    pub checkout_url: String,
    pub tx_ref: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub status: PaymentStatus,
}

// =============================================================================
// Handlers
// =============================================================================

fn payment_service(state: &AppState) -> PaymentService {
    PaymentService::new(
        state.db.clone(),
        state.gateway.clone(),
        state.config.currency.clone(),
        state.config.pending_payment_max_age_secs,
    )
}

/// POST /api/payments/initialize - open a gateway transaction.
pub async fn initialize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InitializePaymentRequest>,
) -> Result<Json<InitializePaymentResponse>, ApiError> {
    let initialized = payment_service(&state)
        .initialize(InitializeDetails {
            user_id: payload.user_id,
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            amount_cents: payload.amount_cents,
        })
        .await?;

    Ok(Json(InitializePaymentResponse {
        checkout_url: initialized.checkout_url,
        tx_ref: initialized.tx_ref,
    }))
}

/// GET /api/payments/verify/:tx_ref - reconcile against the gateway.
///
/// Called by the buyer's browser after the gateway redirect.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Path(tx_ref): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let status = payment_service(&state).verify(&tx_ref).await?;

    Ok(Json(VerifyResponse { status }))
}

/// GET /api/payments/:tx_ref/invoice - render the invoice document.
///
/// Answers 409 for payments that are not Success; the renderer is only
/// invoked post-gate.
pub async fn invoice(
    State(state): State<Arc<AppState>>,
    Path(tx_ref): Path<String>,
) -> Result<Response, ApiError> {
    let service = InvoiceService::new(state.db.clone(), state.renderer.clone());
    let document = service.invoice(&tx_ref).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment"),
        ],
        document,
    )
        .into_response())
}
