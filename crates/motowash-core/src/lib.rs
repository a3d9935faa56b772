//! # motowash-core: Pure Business Logic for MotoWash
//!
//! This crate is the heart of the shop backend: every rule about money,
//! sales, payment splits and till reconciliation lives here as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      MotoWash Architecture                          │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                  apps/api (axum handlers)                     │  │
//! │  │   sales, till, work orders, inventory, invoices               │  │
//! │  └────────────────────────────┬──────────────────────────────────┘  │
//! │                               │                                     │
//! │  ┌────────────────────────────▼──────────────────────────────────┐  │
//! │  │              ★ motowash-core (THIS CRATE) ★                   │  │
//! │  │                                                               │  │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────────────┐    │  │
//! │  │   │  types  │ │  money  │ │   sale   │ │      till      │    │  │
//! │  │   │ Product │ │  Money  │ │  totals  │ │ reconciliation │    │  │
//! │  │   │  Sale   │ │  cents  │ │ payments │ │    summary     │    │  │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────────────┘    │  │
//! │  │                                                               │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │  │
//! │  └────────────────────────────┬──────────────────────────────────┘  │
//! │                               │                                     │
//! │  ┌────────────────────────────▼──────────────────────────────────┐  │
//! │  │                 motowash-db (Database Layer)                  │  │
//! │  │          SQLite queries, migrations, repositories             │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Till, WorkOrder, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`sale`] - Sale totals and payment-split checks
//! - [`till`] - Till close-out reconciliation
//! - [`error`] - Domain error types
//! - [`validation`] - Field and draft validation

pub mod error;
pub mod money;
pub mod sale;
pub mod till;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use sale::SaleTotals;
pub use till::TillSummary;
pub use types::*;

/// Operator name recorded when a request does not identify one.
pub const DEFAULT_OPERATOR: &str = "system";
