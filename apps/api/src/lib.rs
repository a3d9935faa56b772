//! # MotoWash API
//!
//! HTTP server for the shop backend.
//!
//! ## Surface
//! ```text
//! /health                      liveness + db reachability
//! /api/products                inventory CRUD
//! /api/products/available      in-stock picker feed
//! /api/products/price?name=    price lookup (0 when unknown)
//! /api/sales                   sales with stock control
//! /api/till                    till sessions, expenses, close-out
//! /api/work-orders             service orders with deposits
//! /api/invoices                invoice records
//! ```
//!
//! Handlers validate input with motowash-core, delegate the transactional
//! work to motowash-db, and translate every failure into a status code
//! plus `{ "error", "message" }` JSON.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;

pub use app::build_app;
pub use config::ApiConfig;
pub use error::ApiError;
