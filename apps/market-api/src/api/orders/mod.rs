//! Order API module.

mod handler;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/checkout", post(handler::checkout))
        .route("/{order_id}/status", put(handler::update_status))
        .route("/customer/{user_id}", get(handler::customer_orders))
        .route("/seller/{seller_id}", get(handler::seller_orders))
}
