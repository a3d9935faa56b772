//! Repository implementations.
//!
//! One repository per aggregate. Each wraps the shared pool; operations
//! that touch several tables (sale creation, work-order deposits) run
//! inside a single transaction.

pub mod invoice;
pub mod product;
pub mod sale;
pub mod till;
pub mod work_order;
