//! # Status Lifecycles
//!
//! Closed status enums for orders and payments, with their transition rules.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Pending ───► Processing ───► Shipped ───► Delivered (terminal)       │
//! │      │             │                                                    │
//! │      └─────────────┴─────────► Cancelled (terminal)                     │
//! │                                                                         │
//! │   Orders are created Pending by checkout and advanced only by the       │
//! │   owning seller's fulfillment updates. Any edge not drawn above is      │
//! │   rejected with IllegalTransition.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payment Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Pending ───► Success (terminal)                                       │
//! │      │                                                                  │
//! │      └───────► Failed  (terminal)                                       │
//! │                                                                         │
//! │   Payments are created Pending by initialization and advanced only by   │
//! │   reconciliation against the gateway. Terminal states never move.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Order Status
// =============================================================================

/// The status of a marketplace order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created by checkout, not yet picked up by the seller.
    Pending,
    /// Seller has accepted the order and is preparing it.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the buyer. Terminal.
    Delivered,
    /// Called off by the seller before shipping. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether this status permits a fulfillment update to `next`.
    ///
    /// The transition table is closed: exactly the edges below are legal,
    /// everything else is rejected. Self-transitions are not legal.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::OrderStatus;
    ///
    /// assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
    /// assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
    /// ```
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
        )
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// The status of a gateway payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Initialized locally, awaiting gateway settlement.
    Pending,
    /// Gateway affirmed the transaction. Terminal.
    Success,
    /// Gateway definitively answered non-success. Terminal.
    Failed,
}

impl PaymentStatus {
    /// Whether this status admits no further transitions.
    ///
    /// Reconciliation treats terminal payments as settled facts: re-verifying
    /// one returns the stored status without touching the gateway.
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Failed)
    }

    /// Maps the gateway's definitive settled/unsettled answer to a local
    /// terminal status.
    pub fn from_gateway_answer(settled: bool) -> Self {
        if settled {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
