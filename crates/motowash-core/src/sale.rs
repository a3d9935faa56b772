//! # Sale Math
//!
//! Pure arithmetic for point-of-sale transactions.
//!
//! ## The Sale Total
//! ```text
//! subtotal = Σ (quantity × unit price)          over all lines
//! total    = subtotal − discount(subtotal) + labor
//! ```
//! The payment allocations must cover `total` exactly; a 1-cent
//! difference is tolerated to absorb client-side rounding.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentDraft, SaleLineDraft};

/// Maximum absolute difference, in cents, between the sum of payment
/// allocations and the sale total.
pub const PAYMENT_TOLERANCE_CENTS: i64 = 1;

/// Computed totals for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub labor: Money,
    pub total: Money,
}

/// Computes subtotal, discount amount and grand total for a set of lines.
///
/// ## Example
/// ```rust
/// use motowash_core::sale::compute_totals;
/// use motowash_core::types::SaleLineDraft;
///
/// let lines = vec![SaleLineDraft {
///     product_name: "Wax".to_string(),
///     quantity: 2,
///     unit_price_cents: 5000,
/// }];
/// // 10% off, $20.00 labor
/// let totals = compute_totals(&lines, 1000, 2000);
/// assert_eq!(totals.subtotal.cents(), 10000);
/// assert_eq!(totals.discount.cents(), 1000);
/// assert_eq!(totals.total.cents(), 11000);
/// ```
pub fn compute_totals(lines: &[SaleLineDraft], discount_bps: u32, labor_cents: i64) -> SaleTotals {
    let subtotal: Money = lines
        .iter()
        .map(|l| Money::from_cents(l.unit_price_cents).multiply_quantity(l.quantity))
        .sum();
    let discount = subtotal.discount_amount(discount_bps);
    let labor = Money::from_cents(labor_cents);

    SaleTotals {
        subtotal,
        discount,
        labor,
        total: subtotal - discount + labor,
    }
}

/// Merges duplicate lines by product name (case-insensitive).
///
/// Quantities are summed; the first line's unit price wins. Mirrors what
/// the counter UI produces when the same product is scanned twice.
pub fn merge_lines(lines: Vec<SaleLineDraft>) -> Vec<SaleLineDraft> {
    let mut merged: Vec<SaleLineDraft> = Vec::with_capacity(lines.len());

    for line in lines {
        match merged
            .iter_mut()
            .find(|m| m.product_name.eq_ignore_ascii_case(&line.product_name))
        {
            Some(existing) => existing.quantity += line.quantity,
            None => merged.push(line),
        }
    }

    merged
}

/// Checks that the payment allocations cover the sale total.
///
/// ## Errors
/// [`CoreError::PaymentMismatch`] when the absolute difference exceeds
/// [`PAYMENT_TOLERANCE_CENTS`].
pub fn check_payments_cover(payments: &[PaymentDraft], total: Money) -> CoreResult<()> {
    let paid: Money = payments
        .iter()
        .map(|p| Money::from_cents(p.amount_cents))
        .sum();

    if (paid - total).abs().cents() > PAYMENT_TOLERANCE_CENTS {
        return Err(CoreError::PaymentMismatch {
            paid_cents: paid.cents(),
            total_cents: total.cents(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    fn line(name: &str, qty: i64, price: i64) -> SaleLineDraft {
        SaleLineDraft {
            product_name: name.to_string(),
            quantity: qty,
            unit_price_cents: price,
        }
    }

    fn payment(method: PaymentMethod, amount: i64) -> PaymentDraft {
        PaymentDraft {
            method,
            amount_cents: amount,
        }
    }

    #[test]
    fn test_totals_without_discount_or_labor() {
        let totals = compute_totals(&[line("Wax", 2, 500), line("Oil", 1, 1500)], 0, 0);
        assert_eq!(totals.subtotal.cents(), 2500);
        assert_eq!(totals.discount.cents(), 0);
        assert_eq!(totals.total.cents(), 2500);
    }

    #[test]
    fn test_total_is_discounted_subtotal_plus_labor() {
        // subtotal $100.00, 25% off, $30.00 labor → $105.00
        let totals = compute_totals(&[line("Full wash", 1, 10000)], 2500, 3000);
        assert_eq!(totals.subtotal.cents(), 10000);
        assert_eq!(totals.discount.cents(), 2500);
        assert_eq!(totals.labor.cents(), 3000);
        assert_eq!(totals.total.cents(), 10500);
    }

    #[test]
    fn test_empty_lines_total_is_labor_only() {
        let totals = compute_totals(&[], 5000, 700);
        assert_eq!(totals.subtotal.cents(), 0);
        assert_eq!(totals.total.cents(), 700);
    }

    #[test]
    fn test_merge_lines_sums_quantities() {
        let merged = merge_lines(vec![
            line("Wax", 1, 500),
            line("wax", 2, 600),
            line("Oil", 1, 1500),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].product_name, "Wax");
        assert_eq!(merged[0].quantity, 3);
        // First line's price wins.
        assert_eq!(merged[0].unit_price_cents, 500);
        assert_eq!(merged[1].product_name, "Oil");
    }

    #[test]
    fn test_payments_must_cover_total() {
        let total = Money::from_cents(10000);

        // Exact split across methods.
        let ok = [
            payment(PaymentMethod::Cash, 4000),
            payment(PaymentMethod::Transfer, 6000),
        ];
        assert!(check_payments_cover(&ok, total).is_ok());

        // One cent off is tolerated.
        let near = [payment(PaymentMethod::Cash, 9999)];
        assert!(check_payments_cover(&near, total).is_ok());

        // Two cents off is not.
        let short = [payment(PaymentMethod::Cash, 9998)];
        let err = check_payments_cover(&short, total).unwrap_err();
        assert!(matches!(
            err,
            CoreError::PaymentMismatch {
                paid_cents: 9998,
                total_cents: 10000
            }
        ));

        // Overpayment past the tolerance is rejected too.
        let over = [payment(PaymentMethod::Cash, 10002)];
        assert!(check_payments_cover(&over, total).is_err());
    }
}
