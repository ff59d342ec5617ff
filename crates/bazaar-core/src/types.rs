//! # Domain Types
//!
//! Core domain types used throughout the Bazaar marketplace.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  price_cents    │   │  buyer_id       │   │  tx_ref (biz)   │       │
//! │  │  stock_quantity │   │  unit_price @   │   │  amount_cents   │       │
//! │  │  order_count    │   │    purchase     │   │  status         │       │
//! │  │  is_trending    │   │  status         │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Customer     │   │    CartLine     │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  id / user_id   │   │  product_id     │                             │
//! │  │  email          │   │  quantity       │                             │
//! │  │  address        │   │  color? size?   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: (tx_ref for payments, user_id for customers)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::{OrderStatus, PaymentStatus};
use crate::money::Money;
use crate::TRENDING_THRESHOLD;

// =============================================================================
// Product
// =============================================================================

/// A product listed on the marketplace.
///
/// The inventory counters (`stock_quantity`, `order_count`, `is_trending`)
/// belong to the Inventory Ledger: they are only ever written by the guarded
/// reservation UPDATE, never read-modify-written in process memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Seller this product belongs to (opaque identity reference).
    pub seller_id: String,

    /// Display name.
    pub name: String,

    /// Optional long description.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Units currently available. Never negative.
    pub stock_quantity: i64,

    /// Cumulative units ordered. Monotonic.
    pub order_count: i64,

    /// One-way latch: set once `order_count` reaches the trending threshold.
    pub is_trending: bool,

    /// Whether product is listed (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the requested quantity can currently be reserved.
    ///
    /// ## Note
    /// This is a read-side convenience for display. The authoritative check
    /// happens inside the reservation UPDATE's WHERE clause, which is the
    /// only race-free answer under concurrent checkouts.
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }

    /// Whether this product would be trending after `additional` more units.
    pub fn trending_after(&self, additional: i64) -> bool {
        self.is_trending || self.order_count + additional >= TRENDING_THRESHOLD
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A purchaser profile.
///
/// Checkout requires one on file: carts submitted by identities without a
/// profile are rejected before any inventory effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    /// Opaque identity reference carried by requests. Unique.
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cart Line
// =============================================================================

/// A single line of a checkout cart, as submitted by the buyer.
///
/// `color` and `size` are a free-form customization echo: they are copied
/// onto the order verbatim and not validated against any product option set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

// =============================================================================
// Order
// =============================================================================

/// One order row per cart line.
///
/// ## Snapshot Pattern
/// `unit_price_cents` is the product price frozen at reservation time.
/// Catalog price changes never touch existing orders.
///
/// Orders are never deleted (audit trail); only `status` and `updated_at`
/// move after creation, and only through the fulfillment transition table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// Customer id of the buyer.
    pub buyer_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Price per unit at time of purchase (frozen).
    pub unit_price_cents: i64,
    /// unit_price_cents × quantity (frozen).
    pub total_price_cents: i64,
    pub status: OrderStatus,
    /// Buyer-selected color, echoed verbatim.
    pub selected_color: Option<String>,
    /// Buyer-selected size, echoed verbatim.
    pub selected_size: Option<String>,
    /// Creation timestamp, immutable.
    pub order_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the frozen line total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment initialized against the external gateway.
///
/// `tx_ref` is the business key: client-generated, globally unique, immutable,
/// and the correlation handle for gateway verification. There is no foreign
/// key to orders; the amount is caller-supplied (a recorded gap, see
/// DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    /// Opaque identity reference of the payer.
    pub user_id: String,
    /// Unique transaction reference correlating to the gateway transaction.
    pub tx_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub email: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    /// Set by the terminal transition; None while Pending.
    pub verified_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Whether an invoice may be issued for this payment.
    ///
    /// The invoice renderer must never be invoked for a payment that is not
    /// Success; this gate holds no state and performs no gateway calls.
    #[inline]
    pub fn can_issue_invoice(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
