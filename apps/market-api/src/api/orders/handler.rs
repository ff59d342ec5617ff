//! Order API handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use bazaar_core::{CartLine, Order, OrderStatus};

use crate::error::ApiError;
use crate::services::{CheckoutService, FulfillmentService};
use crate::AppState;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Opaque identity reference of the buyer.
    pub user_id: String,
    pub items: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: String,
    pub total_cents: i64,
    pub orders: Vec<OrderDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub status: OrderStatus,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
    pub order_date: String,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        OrderDto {
            order_id: order.id,
            product_id: order.product_id,
            quantity: order.quantity,
            unit_price_cents: order.unit_price_cents,
            total_price_cents: order.total_price_cents,
            status: order.status,
            selected_color: order.selected_color,
            selected_size: order.selected_size,
            order_date: order.order_date.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// Opaque identity reference of the seller performing the update.
    pub seller_id: String,
    pub new_status: OrderStatus,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/orders/checkout - convert a cart into orders.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let service = CheckoutService::new(state.db.clone(), state.notifier.clone());
    let outcome = service.checkout(&payload.user_id, &payload.items).await?;

    Ok(Json(CheckoutResponse {
        message: "Checkout successful".to_string(),
        total_cents: outcome.total_cents,
        orders: outcome.orders.into_iter().map(OrderDto::from).collect(),
    }))
}

/// PUT /api/orders/:order_id/status - seller fulfillment update.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<OrderDto>, ApiError> {
    let service = FulfillmentService::new(state.db.clone());
    let order = service
        .update_status(&order_id, &payload.seller_id, payload.new_status)
        .await?;

    Ok(Json(order.into()))
}

/// GET /api/orders/customer/:user_id - a buyer's order history.
pub async fn customer_orders(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OrderDto>>, ApiError> {
    let service = FulfillmentService::new(state.db.clone());
    let orders = service.customer_orders(&user_id).await?;

    Ok(Json(orders.into_iter().map(OrderDto::from).collect()))
}

/// GET /api/orders/seller/:seller_id - orders against a seller's products.
pub async fn seller_orders(
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<String>,
) -> Result<Json<Vec<OrderDto>>, ApiError> {
    let service = FulfillmentService::new(state.db.clone());
    let orders = service.seller_orders(&seller_id).await?;

    Ok(Json(orders.into_iter().map(OrderDto::from).collect()))
}
