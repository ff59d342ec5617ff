//! Payment API module.

mod handler;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/initialize", post(handler::initialize))
        .route("/verify/{tx_ref}", get(handler::verify))
        .route("/{tx_ref}/invoice", get(handler::invoice))
}
