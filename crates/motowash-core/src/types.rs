//! # Domain Types
//!
//! Core domain types used throughout MotoWash.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐         │
//! │  │   Product    │   │     Sale     │   │      Till        │         │
//! │  │ ───────────  │   │ ───────────  │   │ ───────────────  │         │
//! │  │ id (UUID)    │   │ id (UUID)    │   │ id (UUID)        │         │
//! │  │ name         │   │ plate        │   │ opened_at        │         │
//! │  │ stock        │   │ discount_bps │   │ closed_at (null  │         │
//! │  │ price_cents  │   │ labor_cents  │   │  while open)     │         │
//! │  └──────────────┘   └──────┬───────┘   └────────┬─────────┘         │
//! │                           │                     │                   │
//! │              SaleLine ────┤       TillMovement ─┘                   │
//! │              SalePayment ─┘       (income/expense ledger)           │
//! │                                                                     │
//! │  WorkOrder ── WorkOrderService        Invoice                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity carries a UUID v4 `id`; products additionally use their
//! name as the business key (sales reference inventory by name, matched
//! case-insensitively, as the shop's counter staff do).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How money changed hands. The shop accepts physical cash and bank
/// transfers; each payment allocation and each till movement carries one.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Bank transfer payment.
    Transfer,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Transfer => write!(f, "transfer"),
        }
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// Direction of a till movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Money entering the till (sale payment, work-order deposit).
    Income,
    /// Money leaving the till (manual expense).
    Expense,
}

// =============================================================================
// Work Order Status
// =============================================================================

/// Lifecycle of a work order.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// Vehicle received, work not started.
    Pending,
    /// Work in progress.
    InProgress,
    /// All services done.
    Completed,
}

impl Default for WorkOrderStatus {
    fn default() -> Self {
        WorkOrderStatus::Pending
    }
}

// =============================================================================
// Product
// =============================================================================

/// An inventory product available for sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name; business key, unique case-insensitively.
    pub name: String,

    /// Units currently on hand. Never driven below zero by a sale.
    pub stock: i64,

    /// Sale price in cents.
    pub price_cents: i64,

    /// Acquisition cost in cents (snapshotted onto sale lines).
    pub cost_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A point-of-sale transaction.
///
/// Totals are derived, never stored: `subtotal = Σ line totals`,
/// `total = subtotal − discount + labor`. See [`crate::sale`].
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub occurred_at: DateTime<Utc>,
    /// Vehicle plate, 1-6 uppercase alphanumerics.
    pub plate: String,
    pub mileage: i64,
    /// Discount in basis points (1000 = 10%).
    pub discount_bps: u32,
    /// Labor charge added after the discount.
    pub labor_cents: i64,
    pub customer_name: Option<String>,
    pub customer_id_number: Option<String>,
    pub customer_phone: Option<String>,
    /// The till that was open when the sale was created, if any.
    pub till_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
/// Product name, price and cost are snapshots frozen at time of sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
}

impl SaleLine {
    /// Returns quantity × unit price as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// A payment-method allocation towards a sale.
/// A sale can split its total across several methods.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalePayment {
    pub id: String,
    pub sale_id: String,
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

// =============================================================================
// Till
// =============================================================================

/// A till session, bounded by open and close timestamps.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Till {
    pub id: String,
    pub opened_at: DateTime<Utc>,
    /// `None` while the till is open.
    pub closed_at: Option<DateTime<Utc>>,
    /// Cash counted into the drawer at opening.
    pub opening_cash_cents: i64,
    /// Cash counted at close-out (as reported by the operator).
    pub closing_cash_cents: i64,
    /// Transfer balance confirmed at close-out.
    pub closing_transfer_cents: i64,
    pub opened_by: String,
    pub closed_by: Option<String>,
}

impl Till {
    /// Checks whether the till is still open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}

/// A single ledgered till event.
///
/// Income movements are written automatically for sale payments and
/// work-order deposits; expense movements are recorded manually.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TillMovement {
    pub id: String,
    pub till_id: String,
    pub occurred_at: DateTime<Utc>,
    pub kind: MovementKind,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub description: String,
    /// Set when the movement was produced by a sale.
    pub sale_id: Option<String>,
    /// Set when the movement was produced by a work-order deposit.
    pub work_order_id: Option<String>,
    pub recorded_by: String,
}

// =============================================================================
// Work Order
// =============================================================================

/// A vehicle service record with line-item services and an optional deposit.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    pub vehicle: String,
    pub plate: String,
    pub mileage: Option<i64>,
    pub received_at: DateTime<Utc>,
    /// Deposit taken when the vehicle was received.
    pub deposit_cents: Option<i64>,
    /// Σ service prices; recomputed on every edit.
    pub services_total_cents: i64,
    /// `services_total − deposit`.
    pub balance_due_cents: i64,
    pub status: WorkOrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A service line on a work order.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderService {
    pub id: String,
    pub work_order_id: String,
    pub description: String,
    pub price_cents: i64,
    pub completed: bool,
}

// =============================================================================
// Invoice
// =============================================================================

/// A standalone invoice record.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub number: String,
    pub customer: String,
    pub issued_at: DateTime<Utc>,
    pub total_cents: i64,
    pub notes: Option<String>,
}

// =============================================================================
// Input Types
// =============================================================================
// Plain data carried from the HTTP boundary into validation and the
// repositories. No IDs or timestamps: the server assigns those.

/// Requested sale line before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLineDraft {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Requested payment allocation before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

/// A sale as submitted by the client, prior to validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraft {
    pub plate: String,
    pub mileage: i64,
    pub discount_bps: u32,
    pub labor_cents: i64,
    pub customer_name: Option<String>,
    pub customer_id_number: Option<String>,
    pub customer_phone: Option<String>,
    pub lines: Vec<SaleLineDraft>,
    pub payments: Vec<PaymentDraft>,
}

/// Requested work-order service before persistence.
/// Rows with an empty description are dropped, not rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderServiceDraft {
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub completed: bool,
}

/// A work order as submitted by the client, prior to validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderDraft {
    pub vehicle: String,
    pub plate: String,
    pub mileage: Option<i64>,
    pub deposit_cents: Option<i64>,
    /// How the deposit was received; used for the till movement.
    #[serde(default)]
    pub deposit_method: Option<PaymentMethod>,
    pub status: Option<WorkOrderStatus>,
    pub notes: Option<String>,
    pub services: Vec<WorkOrderServiceDraft>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_can_sell() {
        let now = Utc::now();
        let product = Product {
            id: "p1".to_string(),
            name: "Chain oil".to_string(),
            stock: 3,
            price_cents: 1500,
            cost_cents: 900,
            created_at: now,
            updated_at: now,
        };

        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));
    }

    #[test]
    fn test_sale_line_total() {
        let line = SaleLine {
            id: "l1".to_string(),
            sale_id: "s1".to_string(),
            product_name: "Wax".to_string(),
            quantity: 3,
            unit_price_cents: 250,
            unit_cost_cents: 100,
        };
        assert_eq!(line.line_total().cents(), 750);
    }

    #[test]
    fn test_till_is_open() {
        let till = Till {
            id: "t1".to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_cash_cents: 5000,
            closing_cash_cents: 0,
            closing_transfer_cents: 0,
            opened_by: "ana".to_string(),
            closed_by: None,
        };
        assert!(till.is_open());
    }

    #[test]
    fn test_work_order_status_default() {
        assert_eq!(WorkOrderStatus::default(), WorkOrderStatus::Pending);
    }
}
