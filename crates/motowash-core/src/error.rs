//! # Error Types
//!
//! Domain-specific error types for motowash-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  motowash-core errors (this file)                                   │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  motowash-db errors (separate crate)                                │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  API errors (in apps/api)                                           │
//! │  └── ApiError         - What clients see (JSON body + status)       │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → client    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, amounts, IDs)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// These are caught at the API boundary and surfaced to the client the way
/// the counter UI surfaces a form error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale line references a product that does not exist in inventory.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Not enough units on hand to cover a sale line.
    #[error("insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// The payment allocations do not add up to the sale total.
    /// Allows a 1-cent rounding tolerance; anything beyond that is rejected.
    #[error("payments total {paid_cents} does not match sale total {total_cents}")]
    PaymentMismatch { paid_cents: i64, total_cents: i64 },

    /// A sale must carry at least one line.
    #[error("sale has no lines")]
    EmptySale,

    /// A sale must carry at least one payment allocation.
    #[error("sale has no payment methods")]
    NoPayments,

    /// Opening a till while another is still open.
    #[error("a till is already open")]
    TillAlreadyOpen,

    /// Operating on a till (or a sale whose till) is already closed.
    #[error("till {0} is closed")]
    TillClosed(String),

    /// No till is open for an operation that requires one.
    #[error("no open till")]
    NoOpenTill,

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when client input doesn't meet field-level requirements,
/// before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. malformed plate, malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. duplicate product name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Chain oil".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Chain oil: available 3, requested 5"
        );

        let err = CoreError::PaymentMismatch {
            paid_cents: 900,
            total_cents: 1000,
        };
        assert_eq!(
            err.to_string(),
            "payments total 900 does not match sale total 1000"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "plate".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
