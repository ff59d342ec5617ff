//! HTTP API modules.
//!
//! Each resource gets a `router()` + `handler` pair; this module merges them
//! and adds the health probe. Identity is accepted as opaque ids in request
//! payloads - authentication/token issuance is an external collaborator.

pub mod orders;
pub mod payments;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

/// Builds the full API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(orders::router())
        .merge(payments::router())
        .route("/api/health", get(health))
}

/// GET /api/health - liveness and database reachability.
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "unreachable" })),
        )
    }
}
