//! HTTP routes, one module per counter workflow.

use axum::http::HeaderMap;
use axum::Router;

use motowash_core::DEFAULT_OPERATOR;

pub mod invoices;
pub mod products;
pub mod sales;
pub mod till;
pub mod work_orders;

/// Assembles the /api router.
pub fn api_router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/sales", sales::router())
        .nest("/till", till::router())
        .nest("/work-orders", work_orders::router())
        .nest("/invoices", invoices::router())
}

/// Operator name for audit fields, from the `x-operator` header.
///
/// The counter app forwards the signed-in user's name; anything else
/// (scripts, tests) is recorded as the system operator.
pub(crate) fn operator_from(headers: &HeaderMap) -> String {
    headers
        .get("x-operator")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_OPERATOR)
        .to_string()
}
