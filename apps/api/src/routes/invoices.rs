//! Invoice routes. Plain CRUD.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motowash_core::validation::validate_non_negative;
use motowash_core::Invoice;
use motowash_db::InvoiceInput;

use crate::app::AppState;
use crate::error::ApiError;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/:id", get(get_invoice).delete(delete_invoice))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub number: String,
    pub customer: String,
    pub total_cents: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: String,
    pub number: String,
    pub customer: String,
    pub issued_at: DateTime<Utc>,
    pub total_cents: i64,
    pub notes: Option<String>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(i: Invoice) -> Self {
        InvoiceResponse {
            id: i.id,
            number: i.number,
            customer: i.customer,
            issued_at: i.issued_at,
            total_cents: i.total_cents,
            notes: i.notes,
        }
    }
}

async fn list_invoices(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let invoices = state.db.invoices().list().await?;
    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}

async fn create_invoice(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<InvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    if req.number.trim().is_empty() {
        return Err(ApiError::validation("number is required"));
    }
    if req.customer.trim().is_empty() {
        return Err(ApiError::validation("customer is required"));
    }
    validate_non_negative("total", req.total_cents)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let invoice = state
        .db
        .invoices()
        .create(&InvoiceInput {
            number: req.number.trim().to_string(),
            customer: req.customer.trim().to_string(),
            total_cents: req.total_cents,
            notes: req.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(invoice.into())))
}

async fn get_invoice(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state
        .db
        .invoices()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("invoice", &id))?;
    Ok(Json(invoice.into()))
}

async fn delete_invoice(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.invoices().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
