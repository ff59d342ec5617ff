//! # Repository Module
//!
//! Database repository implementations for the marketplace.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service layer                                                          │
//! │       │                                                                 │
//! │       │  db.products().reserve_stock(id, qty)                           │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── insert(&self, product)                                             │
//! │  └── reserve_stock(&self, id, qty)   ← the guarded inventory UPDATE     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • The inventory counters have a single writer path                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Inventory Ledger: stock reservation, trending latch
//! - [`customer::CustomerRepository`] - Purchaser profiles
//! - [`order::OrderRepository`] - Order Store: checkout transaction, fulfillment updates
//! - [`payment::PaymentRepository`] - Payment Ledger: CAS status transitions

pub mod customer;
pub mod order;
pub mod payment;
pub mod product;
