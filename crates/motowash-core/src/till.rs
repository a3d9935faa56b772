//! # Till Reconciliation
//!
//! Close-out arithmetic for a till session.
//!
//! ## What the Summary Answers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  CLOSE-OUT SHEET                                                    │
//! │                                                                     │
//! │  Opening cash ..................... what was counted in at open     │
//! │  + cash from sales                                                  │
//! │  + cash from work-order deposits                                    │
//! │  + other cash income                                                │
//! │  − cash expenses                                                    │
//! │  ─────────────────────────────                                      │
//! │  = expected cash in drawer                                          │
//! │                                                                     │
//! │  Transfers have no opening balance: expected transfer is income     │
//! │  minus expenses for the session.                                    │
//! │                                                                     │
//! │  The operator then counts the drawer; the difference between the    │
//! │  count and the expected figures is the shortage/overage.            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::money::Money;
use crate::types::{MovementKind, PaymentMethod, Till, TillMovement};

/// Close-out summary for a till session.
///
/// Income is split by method and by origin (sale, work-order deposit,
/// other); expenses by method only, since they are always manual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TillSummary {
    pub opening_cash: Money,

    pub cash_sales: Money,
    pub cash_deposits: Money,
    pub cash_other_income: Money,
    pub cash_expenses: Money,

    pub transfer_sales: Money,
    pub transfer_deposits: Money,
    pub transfer_other_income: Money,
    pub transfer_expenses: Money,

    /// opening cash + all cash income − cash expenses.
    pub expected_cash: Money,
    /// all transfer income − transfer expenses.
    pub expected_transfer: Money,
}

impl TillSummary {
    /// Computes the close-out summary from a till and its full ledger.
    ///
    /// Movements belonging to other tills must not be passed in; this is
    /// plain arithmetic and does no filtering by `till_id`.
    pub fn compute(till: &Till, movements: &[TillMovement]) -> TillSummary {
        let mut summary = TillSummary {
            opening_cash: Money::from_cents(till.opening_cash_cents),
            ..TillSummary::default()
        };

        for m in movements {
            let amount = Money::from_cents(m.amount_cents);
            let bucket = match (m.kind, m.method) {
                (MovementKind::Expense, PaymentMethod::Cash) => &mut summary.cash_expenses,
                (MovementKind::Expense, PaymentMethod::Transfer) => &mut summary.transfer_expenses,
                (MovementKind::Income, method) => {
                    let (sales, deposits, other) = match method {
                        PaymentMethod::Cash => (
                            &mut summary.cash_sales,
                            &mut summary.cash_deposits,
                            &mut summary.cash_other_income,
                        ),
                        PaymentMethod::Transfer => (
                            &mut summary.transfer_sales,
                            &mut summary.transfer_deposits,
                            &mut summary.transfer_other_income,
                        ),
                    };
                    if m.sale_id.is_some() {
                        sales
                    } else if m.work_order_id.is_some() {
                        deposits
                    } else {
                        other
                    }
                }
            };
            *bucket += amount;
        }

        summary.expected_cash = summary.opening_cash + summary.cash_sales
            + summary.cash_deposits
            + summary.cash_other_income
            - summary.cash_expenses;
        summary.expected_transfer = summary.transfer_sales
            + summary.transfer_deposits
            + summary.transfer_other_income
            - summary.transfer_expenses;

        summary
    }

    /// Drawer shortage (negative) or overage (positive) against a count.
    #[inline]
    pub fn cash_difference(&self, counted: Money) -> Money {
        counted - self.expected_cash
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
