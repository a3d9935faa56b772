//! Sale routes.
//!
//! POST here is the multi-table sequence the whole app revolves around:
//! validate the form, then let the repository deduct stock, write the
//! sale and feed the till ledger inside one transaction.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use motowash_core::sale::compute_totals;
use motowash_core::validation::validate_sale;
use motowash_core::{PaymentDraft, PaymentMethod, SaleDraft, SaleLineDraft};
use motowash_db::{SaleFilter, SaleWithDetails};

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::operator_from;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/:id", get(get_sale).put(update_sale).delete(delete_sale))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub plate: String,
    pub mileage: i64,
    #[serde(default)]
    pub discount_bps: u32,
    #[serde(default)]
    pub labor_cents: i64,
    pub customer_name: Option<String>,
    pub customer_id_number: Option<String>,
    pub customer_phone: Option<String>,
    pub lines: Vec<SaleLineRequest>,
    pub payments: Vec<PaymentRequest>,
}

impl SaleRequest {
    fn into_draft(self) -> SaleDraft {
        SaleDraft {
            plate: self.plate,
            mileage: self.mileage,
            discount_bps: self.discount_bps,
            labor_cents: self.labor_cents,
            customer_name: self.customer_name,
            customer_id_number: self.customer_id_number,
            customer_phone: self.customer_phone,
            lines: self
                .lines
                .into_iter()
                .map(|l| SaleLineDraft {
                    product_name: l.product_name,
                    quantity: l.quantity,
                    unit_price_cents: l.unit_price_cents,
                })
                .collect(),
            payments: self
                .payments
                .into_iter()
                .map(|p| PaymentDraft {
                    method: p.method,
                    amount_cents: p.amount_cents,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineResponse {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: String,
    pub occurred_at: DateTime<Utc>,
    pub plate: String,
    pub mileage: i64,
    pub discount_bps: u32,
    pub labor_cents: i64,
    pub customer_name: Option<String>,
    pub customer_id_number: Option<String>,
    pub customer_phone: Option<String>,
    pub till_id: Option<String>,
    pub lines: Vec<SaleLineResponse>,
    pub payments: Vec<PaymentResponse>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl From<SaleWithDetails> for SaleResponse {
    fn from(details: SaleWithDetails) -> Self {
        let SaleWithDetails {
            sale,
            lines,
            payments,
        } = details;

        // Totals are derived, exactly as the counter sheet computes them.
        let drafts: Vec<SaleLineDraft> = lines
            .iter()
            .map(|l| SaleLineDraft {
                product_name: l.product_name.clone(),
                quantity: l.quantity,
                unit_price_cents: l.unit_price_cents,
            })
            .collect();
        let totals = compute_totals(&drafts, sale.discount_bps, sale.labor_cents);

        SaleResponse {
            id: sale.id,
            occurred_at: sale.occurred_at,
            plate: sale.plate,
            mileage: sale.mileage,
            discount_bps: sale.discount_bps,
            labor_cents: sale.labor_cents,
            customer_name: sale.customer_name,
            customer_id_number: sale.customer_id_number,
            customer_phone: sale.customer_phone,
            till_id: sale.till_id,
            lines: lines
                .into_iter()
                .map(|l| SaleLineResponse {
                    line_total_cents: l.line_total().cents(),
                    product_name: l.product_name,
                    quantity: l.quantity,
                    unit_price_cents: l.unit_price_cents,
                })
                .collect(),
            payments: payments
                .into_iter()
                .map(|p| PaymentResponse {
                    method: p.method,
                    amount_cents: p.amount_cents,
                })
                .collect(),
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    /// Calendar date filter (YYYY-MM-DD). Wins over plate.
    pub date: Option<NaiveDate>,
    /// Plate substring filter.
    pub plate: Option<String>,
}

async fn list_sales(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<Vec<SaleResponse>>, ApiError> {
    let filter = SaleFilter {
        date: query.date,
        plate: query.plate,
    };
    let sales = state.db.sales().list(&filter).await?;
    Ok(Json(sales.into_iter().map(Into::into).collect()))
}

async fn create_sale(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), ApiError> {
    let draft = req.into_draft();
    validate_sale(&draft)?;

    let operator = operator_from(&headers);
    let created = state.db.sales().create(&draft, &operator).await.map_err(|e| {
        warn!(error = %e, plate = %draft.plate, "sale creation failed");
        e
    })?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_sale(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SaleResponse>, ApiError> {
    let sale = state
        .db
        .sales()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("sale", &id))?;
    Ok(Json(sale.into()))
}

async fn update_sale(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SaleRequest>,
) -> Result<Json<SaleResponse>, ApiError> {
    let draft = req.into_draft();
    validate_sale(&draft)?;

    let updated = state.db.sales().update(&id, &draft).await.map_err(|e| {
        warn!(error = %e, sale_id = %id, "sale update failed");
        e
    })?;

    Ok(Json(updated.into()))
}

async fn delete_sale(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.sales().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
