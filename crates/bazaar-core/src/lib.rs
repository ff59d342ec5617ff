//! # bazaar-core: Pure Business Logic for the Bazaar Marketplace
//!
//! This crate is the **heart** of the marketplace backend. It contains all
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bazaar Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  market-api (HTTP service)                      │   │
//! │  │    checkout ──► fulfillment ──► payments ──► invoices          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ lifecycle │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Order/   │  │   rules   │  │   │
//! │  │   │  Order    │  │  (cents)  │  │  Payment  │  │  checks   │  │   │
//! │  │   │  Payment  │  │           │  │  status   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          bazaar-db (SQLite)      bazaar-gateway (HTTP)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Order, Payment, CartLine)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`lifecycle`] - Closed status enums and their transition rules
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Closed Enums**: Order and payment statuses are tagged enums with explicit
//!    transition tables, never free-form strings

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bazaar_core::Money` instead of
// `use bazaar_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::{OrderStatus, PaymentStatus};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Cumulative order count at which a product becomes trending.
///
/// The flag is a one-way latch: once `order_count` reaches this threshold the
/// product stays trending, no operation in this core resets it.
pub const TRENDING_THRESHOLD: i64 = 5;

/// Maximum line items allowed in a single checkout cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps the checkout transaction bounded.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Prefix for client-generated transaction references.
///
/// A tx_ref correlates a local Payment row with the remote gateway
/// transaction; format: `TX-` followed by the first 8 hex chars of a UUID v4.
pub const TX_REF_PREFIX: &str = "TX-";

/// Generates a fresh unique transaction reference.
///
/// ## Example
/// ```rust
/// let tx_ref = bazaar_core::generate_tx_ref();
/// assert!(tx_ref.starts_with("TX-"));
/// assert_eq!(tx_ref.len(), 11);
/// ```
pub fn generate_tx_ref() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", TX_REF_PREFIX, &id[..8])
}
