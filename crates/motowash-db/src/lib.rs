//! # motowash-db: Database Layer for MotoWash
//!
//! SQLite access for the shop backend, via sqlx.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, sale, till, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use motowash_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/motowash.db")).await?;
//! let sale = db.sales().create(&draft, "ana").await?;
//! let summary = db.tills().summary(&till_id).await?;
//! ```
//!
//! The multi-table sequences (sale creation with stock deduction and
//! till-ledger writes, work-order deposits) each run inside one SQLite
//! transaction; any failure rolls the whole sequence back.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::invoice::{InvoiceInput, InvoiceRepository};
pub use repository::product::{ProductInput, ProductRepository};
pub use repository::sale::{SaleFilter, SaleRepository, SaleWithDetails};
pub use repository::till::{TillRepository, TillWithSummary};
pub use repository::work_order::{WorkOrderRepository, WorkOrderWithServices};
