//! Work-order routes.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motowash_core::validation::validate_work_order;
use motowash_core::{
    PaymentMethod, WorkOrderDraft, WorkOrderServiceDraft, WorkOrderStatus,
};
use motowash_db::WorkOrderWithServices;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::operator_from;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_work_orders).post(create_work_order))
        .route(
            "/:id",
            get(get_work_order)
                .put(update_work_order)
                .delete(delete_work_order),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub description: String,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderRequest {
    pub vehicle: String,
    pub plate: String,
    pub mileage: Option<i64>,
    pub deposit_cents: Option<i64>,
    pub deposit_method: Option<PaymentMethod>,
    pub status: Option<WorkOrderStatus>,
    pub notes: Option<String>,
    pub services: Vec<ServiceRequest>,
}

impl WorkOrderRequest {
    fn into_draft(self) -> WorkOrderDraft {
        WorkOrderDraft {
            vehicle: self.vehicle,
            plate: self.plate,
            mileage: self.mileage,
            deposit_cents: self.deposit_cents,
            deposit_method: self.deposit_method,
            status: self.status,
            notes: self.notes,
            services: self
                .services
                .into_iter()
                .map(|s| WorkOrderServiceDraft {
                    description: s.description,
                    price_cents: s.price_cents,
                    completed: s.completed,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: String,
    pub description: String,
    pub price_cents: i64,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderResponse {
    pub id: String,
    pub vehicle: String,
    pub plate: String,
    pub mileage: Option<i64>,
    pub received_at: DateTime<Utc>,
    pub deposit_cents: Option<i64>,
    pub services_total_cents: i64,
    pub balance_due_cents: i64,
    pub status: WorkOrderStatus,
    pub notes: Option<String>,
    pub services: Vec<ServiceResponse>,
}

impl From<WorkOrderWithServices> for WorkOrderResponse {
    fn from(detail: WorkOrderWithServices) -> Self {
        let WorkOrderWithServices {
            work_order,
            services,
        } = detail;

        WorkOrderResponse {
            id: work_order.id,
            vehicle: work_order.vehicle,
            plate: work_order.plate,
            mileage: work_order.mileage,
            received_at: work_order.received_at,
            deposit_cents: work_order.deposit_cents,
            services_total_cents: work_order.services_total_cents,
            balance_due_cents: work_order.balance_due_cents,
            status: work_order.status,
            notes: work_order.notes,
            services: services
                .into_iter()
                .map(|s| ServiceResponse {
                    id: s.id,
                    description: s.description,
                    price_cents: s.price_cents,
                    completed: s.completed,
                })
                .collect(),
        }
    }
}

async fn list_work_orders(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<WorkOrderResponse>>, ApiError> {
    let orders = state.db.work_orders().list().await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

async fn create_work_order(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<WorkOrderRequest>,
) -> Result<(StatusCode, Json<WorkOrderResponse>), ApiError> {
    let draft = req.into_draft();
    validate_work_order(&draft)?;

    let operator = operator_from(&headers);
    let created = state.db.work_orders().create(&draft, &operator).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_work_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkOrderResponse>, ApiError> {
    let order = state
        .db
        .work_orders()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("work order", &id))?;
    Ok(Json(order.into()))
}

async fn update_work_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<WorkOrderRequest>,
) -> Result<Json<WorkOrderResponse>, ApiError> {
    let draft = req.into_draft();
    validate_work_order(&draft)?;

    let updated = state.db.work_orders().update(&id, &draft).await?;
    Ok(Json(updated.into()))
}

async fn delete_work_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.work_orders().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
