//! # Bazaar Market API
//!
//! The exposed HTTP service over the marketplace core.
//!
//! ## Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Exposed Entry Points                             │
//! │                                                                         │
//! │  POST /api/orders/checkout          cart → orders + total               │
//! │  PUT  /api/orders/{id}/status       seller fulfillment update           │
//! │  GET  /api/orders/customer/{uid}    buyer order history                 │
//! │  GET  /api/orders/seller/{sid}      seller order dashboard              │
//! │                                                                         │
//! │  POST /api/payments/initialize      → { checkoutUrl, txRef }            │
//! │  GET  /api/payments/verify/{ref}    → { status }                        │
//! │  GET  /api/payments/{ref}/invoice   → document bytes (409 pre-gate)     │
//! │                                                                         │
//! │  GET  /api/health                   liveness probe                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (all with development defaults):
//! - `HTTP_PORT` - server port (default: 8080)
//! - `DATABASE_PATH` - SQLite file path
//! - `GATEWAY_BASE_URL` / `GATEWAY_SECRET_KEY` / `GATEWAY_RETURN_URL`
//! - `GATEWAY_TIMEOUT_SECS` - bound on outbound gateway requests
//! - `MARKET_CURRENCY` - currency code for gateway transactions
//! - `SWEEP_INTERVAL_SECS` / `PENDING_PAYMENT_MAX_AGE_SECS` - stale sweep

pub mod api;
pub mod config;
pub mod error;
pub mod services;

use std::sync::Arc;

use bazaar_db::Database;
use bazaar_gateway::PaymentGateway;

use crate::config::MarketConfig;
use crate::services::{InvoiceRenderer, NotificationSender};

// Re-exports
pub use config::ConfigError;
pub use error::{ApiError, ErrorCode};

/// Shared application state.
///
/// Handlers construct the service they need from these handles; the trait
/// objects are the seams test doubles plug into.
pub struct AppState {
    pub db: Database,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn NotificationSender>,
    pub renderer: Arc<dyn InvoiceRenderer>,
    pub config: MarketConfig,
}
