//! # Service Layer
//!
//! Orchestration between the HTTP surface and the core crates.
//!
//! ## Service Organization
//! ```text
//! services/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── checkout.rs     ◄─── Cart → orders, the only order-creating path
//! ├── fulfillment.rs  ◄─── Seller status updates through the lifecycle table
//! ├── payment.rs      ◄─── Gateway initialize/verify + stale-payment sweep
//! ├── invoice.rs      ◄─── Eligibility gate + document rendering seam
//! └── notify.rs       ◄─── Best-effort notification seam
//! ```
//!
//! Services own no HTTP concerns; handlers construct them from shared state
//! and translate their results into responses.

pub mod checkout;
pub mod fulfillment;
pub mod invoice;
pub mod notify;
pub mod payment;

pub use checkout::{CheckoutOutcome, CheckoutService};
pub use fulfillment::FulfillmentService;
pub use invoice::{InvoiceRenderer, InvoiceService, TextInvoiceRenderer};
pub use notify::{NotificationSender, TracingNotificationSender};
pub use payment::{InitializeDetails, InitializedPayment, PaymentService};
