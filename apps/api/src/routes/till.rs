//! Till routes: open, expense, summary, close.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motowash_core::validation::validate_non_negative;
use motowash_core::{MovementKind, PaymentMethod, Till, TillMovement, TillSummary};
use motowash_db::TillWithSummary;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::operator_from;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tills))
        .route("/open", post(open_till))
        .route("/current", get(current_till))
        .route("/:id", get(till_detail))
        .route("/:id/summary", get(till_summary))
        .route("/:id/close", post(close_till))
        .route("/:id/expenses", post(record_expense))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTillRequest {
    pub opening_cash_cents: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTillRequest {
    pub closing_cash_cents: i64,
    pub closing_transfer_cents: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TillResponse {
    pub id: String,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub opening_cash_cents: i64,
    pub closing_cash_cents: i64,
    pub closing_transfer_cents: i64,
    pub opened_by: String,
    pub closed_by: Option<String>,
}

impl From<Till> for TillResponse {
    fn from(t: Till) -> Self {
        TillResponse {
            id: t.id,
            opened_at: t.opened_at,
            closed_at: t.closed_at,
            opening_cash_cents: t.opening_cash_cents,
            closing_cash_cents: t.closing_cash_cents,
            closing_transfer_cents: t.closing_transfer_cents,
            opened_by: t.opened_by,
            closed_by: t.closed_by,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResponse {
    pub id: String,
    pub occurred_at: DateTime<Utc>,
    pub kind: MovementKind,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub description: String,
    pub sale_id: Option<String>,
    pub work_order_id: Option<String>,
    pub recorded_by: String,
}

impl From<TillMovement> for MovementResponse {
    fn from(m: TillMovement) -> Self {
        MovementResponse {
            id: m.id,
            occurred_at: m.occurred_at,
            kind: m.kind,
            method: m.method,
            amount_cents: m.amount_cents,
            description: m.description,
            sale_id: m.sale_id,
            work_order_id: m.work_order_id,
            recorded_by: m.recorded_by,
        }
    }
}

/// The close-out sheet, all figures in cents.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub opening_cash_cents: i64,
    pub cash_sales_cents: i64,
    pub cash_deposits_cents: i64,
    pub cash_other_income_cents: i64,
    pub cash_expenses_cents: i64,
    pub transfer_sales_cents: i64,
    pub transfer_deposits_cents: i64,
    pub transfer_other_income_cents: i64,
    pub transfer_expenses_cents: i64,
    pub expected_cash_cents: i64,
    pub expected_transfer_cents: i64,
}

impl From<TillSummary> for SummaryResponse {
    fn from(s: TillSummary) -> Self {
        SummaryResponse {
            opening_cash_cents: s.opening_cash.cents(),
            cash_sales_cents: s.cash_sales.cents(),
            cash_deposits_cents: s.cash_deposits.cents(),
            cash_other_income_cents: s.cash_other_income.cents(),
            cash_expenses_cents: s.cash_expenses.cents(),
            transfer_sales_cents: s.transfer_sales.cents(),
            transfer_deposits_cents: s.transfer_deposits.cents(),
            transfer_other_income_cents: s.transfer_other_income.cents(),
            transfer_expenses_cents: s.transfer_expenses.cents(),
            expected_cash_cents: s.expected_cash.cents(),
            expected_transfer_cents: s.expected_transfer.cents(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TillDetailResponse {
    #[serde(flatten)]
    pub till: TillResponse,
    pub movements: Vec<MovementResponse>,
    pub summary: SummaryResponse,
}

impl From<TillWithSummary> for TillDetailResponse {
    fn from(detail: TillWithSummary) -> Self {
        TillDetailResponse {
            till: detail.till.into(),
            movements: detail.movements.into_iter().map(Into::into).collect(),
            summary: detail.summary.into(),
        }
    }
}

async fn list_tills(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<TillResponse>>, ApiError> {
    let tills = state.db.tills().list().await?;
    Ok(Json(tills.into_iter().map(Into::into).collect()))
}

async fn open_till(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<OpenTillRequest>,
) -> Result<(StatusCode, Json<TillResponse>), ApiError> {
    validate_non_negative("opening cash", req.opening_cash_cents)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let operator = operator_from(&headers);
    let till = state
        .db
        .tills()
        .open(req.opening_cash_cents, &operator)
        .await?;

    Ok((StatusCode::CREATED, Json(till.into())))
}

/// GET /api/till/current - the open till, 404 when the drawer is shut.
async fn current_till(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<TillResponse>, ApiError> {
    let till = state
        .db
        .tills()
        .current_open()
        .await?
        .ok_or_else(|| ApiError::not_found("open till", "current"))?;
    Ok(Json(till.into()))
}

async fn till_detail(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TillDetailResponse>, ApiError> {
    let detail = state.db.tills().summary(&id).await?;
    Ok(Json(detail.into()))
}

/// The close-out sheet alone, for the pre-close review screen.
async fn till_summary(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let detail = state.db.tills().summary(&id).await?;
    Ok(Json(detail.summary.into()))
}

async fn close_till(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<CloseTillRequest>,
) -> Result<Json<TillResponse>, ApiError> {
    validate_non_negative("closing cash", req.closing_cash_cents)
        .map_err(|e| ApiError::validation(e.to_string()))?;
    validate_non_negative("closing transfer", req.closing_transfer_cents)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let operator = operator_from(&headers);
    let till = state
        .db
        .tills()
        .close(
            &id,
            req.closing_cash_cents,
            req.closing_transfer_cents,
            &operator,
        )
        .await?;

    Ok(Json(till.into()))
}

async fn record_expense(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ExpenseRequest>,
) -> Result<(StatusCode, Json<MovementResponse>), ApiError> {
    if req.amount_cents <= 0 {
        return Err(ApiError::validation("amount must be positive"));
    }
    if req.description.trim().is_empty() {
        return Err(ApiError::validation("description is required"));
    }

    let operator = operator_from(&headers);
    let movement = state
        .db
        .tills()
        .add_expense(
            &id,
            req.method,
            req.amount_cents,
            req.description.trim(),
            &operator,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(movement.into())))
}
