//! # Validation Module
//!
//! Field-level validation for client input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: HTTP handler (deserialization, this module)               │
//! │  Layer 2: Repository (stock re-checked inside the transaction)      │
//! │  Layer 3: Database (NOT NULL, UNIQUE, foreign keys)                 │
//! │                                                                     │
//! │  Defense in depth: the stock check in particular MUST repeat        │
//! │  inside the transaction, because it races with other requests.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::sale::{check_payments_cover, compute_totals, SaleTotals};
use crate::types::{SaleDraft, WorkOrderDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum line quantity on a single sale line.
/// Guards against fat-finger entries (1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a vehicle plate.
///
/// ## Rules
/// - 1 to 6 characters
/// - uppercase letters and digits only
///
/// ## Example
/// ```rust
/// use motowash_core::validation::validate_plate;
///
/// assert!(validate_plate("ABC123").is_ok());
/// assert!(validate_plate("abc123").is_err());
/// assert!(validate_plate("").is_err());
/// ```
pub fn validate_plate(plate: &str) -> ValidationResult<()> {
    if plate.is_empty() {
        return Err(ValidationError::Required {
            field: "plate".to_string(),
        });
    }

    if plate.len() > 6 {
        return Err(ValidationError::TooLong {
            field: "plate".to_string(),
            max: 6,
        });
    }

    if !plate
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidFormat {
            field: "plate".to_string(),
            reason: "must be 1-6 uppercase letters or digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a line quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or amount that may be zero.
pub fn validate_non_negative(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount rate in basis points (0% to 100%).
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Draft Validators
// =============================================================================

/// Validates a submitted sale and returns its computed totals.
///
/// Field checks, then the business rules the counter form enforces:
/// at least one line, at least one payment, payments covering the total.
/// Stock is NOT checked here; that happens inside the sale transaction.
pub fn validate_sale(draft: &SaleDraft) -> CoreResult<SaleTotals> {
    validate_plate(&draft.plate)?;
    validate_non_negative("mileage", draft.mileage)?;
    validate_discount_bps(draft.discount_bps)?;
    validate_non_negative("labor", draft.labor_cents)?;

    if draft.lines.is_empty() {
        return Err(CoreError::EmptySale);
    }
    if draft.payments.is_empty() {
        return Err(CoreError::NoPayments);
    }

    for line in &draft.lines {
        validate_product_name(&line.product_name)?;
        validate_quantity(line.quantity)?;
        if line.unit_price_cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "unit price".to_string(),
            }
            .into());
        }
    }

    for payment in &draft.payments {
        if payment.amount_cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "payment amount".to_string(),
            }
            .into());
        }
    }

    let totals = compute_totals(&draft.lines, draft.discount_bps, draft.labor_cents);
    check_payments_cover(&draft.payments, totals.total)?;

    Ok(totals)
}

/// Validates a submitted work order.
///
/// Service rows with empty descriptions are the form's blank trailing
/// rows; the caller drops them before computing totals, so they are not
/// an error here.
pub fn validate_work_order(draft: &WorkOrderDraft) -> CoreResult<()> {
    if draft.vehicle.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "vehicle".to_string(),
        }
        .into());
    }
    validate_plate(&draft.plate)?;

    if let Some(mileage) = draft.mileage {
        validate_non_negative("mileage", mileage)?;
    }
    if let Some(deposit) = draft.deposit_cents {
        validate_non_negative("deposit", deposit)?;
    }

    for service in &draft.services {
        if !service.description.trim().is_empty() {
            validate_non_negative("service price", service.price_cents)?;
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentDraft, PaymentMethod, SaleLineDraft, WorkOrderServiceDraft};

    fn sale_draft() -> SaleDraft {
        SaleDraft {
            plate: "ABC123".to_string(),
            mileage: 12000,
            discount_bps: 0,
            labor_cents: 0,
            customer_name: None,
            customer_id_number: None,
            customer_phone: None,
            lines: vec![SaleLineDraft {
                product_name: "Wax".to_string(),
                quantity: 2,
                unit_price_cents: 500,
            }],
            payments: vec![PaymentDraft {
                method: PaymentMethod::Cash,
                amount_cents: 1000,
            }],
        }
    }

    #[test]
    fn test_validate_plate() {
        assert!(validate_plate("ABC123").is_ok());
        assert!(validate_plate("A").is_ok());
        assert!(validate_plate("").is_err());
        assert!(validate_plate("abc123").is_err());
        assert!(validate_plate("ABC-12").is_err());
        assert!(validate_plate("ABC1234").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_sale_happy_path() {
        let totals = validate_sale(&sale_draft()).unwrap();
        assert_eq!(totals.total.cents(), 1000);
    }

    #[test]
    fn test_validate_sale_rejects_empty_lines() {
        let mut draft = sale_draft();
        draft.lines.clear();
        assert!(matches!(
            validate_sale(&draft).unwrap_err(),
            CoreError::EmptySale
        ));
    }

    #[test]
    fn test_validate_sale_rejects_missing_payments() {
        let mut draft = sale_draft();
        draft.payments.clear();
        assert!(matches!(
            validate_sale(&draft).unwrap_err(),
            CoreError::NoPayments
        ));
    }

    #[test]
    fn test_validate_sale_rejects_payment_mismatch() {
        let mut draft = sale_draft();
        draft.payments[0].amount_cents = 500;
        assert!(matches!(
            validate_sale(&draft).unwrap_err(),
            CoreError::PaymentMismatch { .. }
        ));
    }

    #[test]
    fn test_validate_work_order() {
        let draft = WorkOrderDraft {
            vehicle: "Honda CB190".to_string(),
            plate: "XYZ99".to_string(),
            mileage: Some(30000),
            deposit_cents: Some(5000),
            deposit_method: Some(PaymentMethod::Cash),
            status: None,
            notes: None,
            services: vec![WorkOrderServiceDraft {
                description: "Oil change".to_string(),
                price_cents: 8000,
                completed: false,
            }],
        };
        assert!(validate_work_order(&draft).is_ok());

        let mut bad = draft.clone();
        bad.vehicle = "  ".to_string();
        assert!(validate_work_order(&bad).is_err());
    }
}
