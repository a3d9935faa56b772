//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! Every domain and database error is caught at the handler boundary,
//! logged, and translated into a status code plus a JSON body:
//!
//! ```json
//! { "error": "insufficient_stock", "message": "insufficient stock for Wax: available 3, requested 5" }
//! ```
//!
//! This is the server-rendered app's flash message, reshaped for JSON
//! clients: same text, same "stay on the form and show the problem"
//! contract.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use motowash_core::CoreError;
use motowash_db::DbError;

/// Machine-readable error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,
    /// Input validation failed (400)
    Validation,
    /// Business rule violation (422)
    BusinessRule,
    /// Not enough stock to complete a sale (422)
    InsufficientStock,
    /// Payment allocations don't match the sale total (422)
    PaymentMismatch,
    /// Till state conflict: already open, already closed (409)
    TillConflict,
    /// Database operation failed (500)
    Database,
    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::BusinessRule
            | ErrorCode::InsufficientStock
            | ErrorCode::PaymentMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::TillConflict => StatusCode::CONFLICT,
            ErrorCode::Database | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not_found",
            ErrorCode::Validation => "validation_error",
            ErrorCode::BusinessRule => "business_rule",
            ErrorCode::InsufficientStock => "insufficient_stock",
            ErrorCode::PaymentMismatch => "payment_mismatch",
            ErrorCode::TillConflict => "till_conflict",
            ErrorCode::Database => "database_error",
            ErrorCode::Internal => "internal_error",
        }
    }
}

/// API error returned from handlers.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Validation, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.code.status(),
            Json(json!({
                "error": self.code.as_str(),
                "message": self.message,
            })),
        )
            .into_response()
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Validation(_) => ErrorCode::Validation,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::PaymentMismatch { .. } => ErrorCode::PaymentMismatch,
            CoreError::TillAlreadyOpen | CoreError::TillClosed(_) | CoreError::NoOpenTill => {
                ErrorCode::TillConflict
            }
            // A sale referencing an unknown product is a form error,
            // not a missing-resource 404.
            CoreError::ProductNotFound(_) | CoreError::EmptySale | CoreError::NoPayments => {
                ErrorCode::BusinessRule
            }
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::Domain(core) => core.into(),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!(%message, "foreign key violation");
                ApiError::validation("invalid reference")
            }
            other => {
                // Log the real failure; clients get a generic message.
                tracing::error!(error = %other, "database operation failed");
                ApiError::new(ErrorCode::Database, "database operation failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = CoreError::TillAlreadyOpen.into();
        assert_eq!(err.code, ErrorCode::TillConflict);

        let err: ApiError = CoreError::InsufficientStock {
            name: "Wax".to_string(),
            available: 1,
            requested: 2,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err: ApiError = DbError::not_found("sale", "abc").into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
