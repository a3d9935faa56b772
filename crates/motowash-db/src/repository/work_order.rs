//! # Work Order Repository
//!
//! Database operations for vehicle service orders.
//!
//! Totals are recomputed from the service rows on every write:
//! `services_total = Σ price`, `balance_due = services_total − deposit`.
//! A deposit taken while a till is open lands in that till's ledger.

use chrono::Utc;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use motowash_core::{
    MovementKind, PaymentMethod, Till, WorkOrder, WorkOrderDraft, WorkOrderService,
    WorkOrderServiceDraft,
};

/// A work order with its service lines attached.
#[derive(Debug, Clone, Serialize)]
pub struct WorkOrderWithServices {
    pub work_order: WorkOrder,
    pub services: Vec<WorkOrderService>,
}

/// Repository for work-order database operations.
#[derive(Debug, Clone)]
pub struct WorkOrderRepository {
    pool: SqlitePool,
}

impl WorkOrderRepository {
    /// Creates a new WorkOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WorkOrderRepository { pool }
    }

    /// Creates a work order.
    ///
    /// Service rows with empty descriptions (the form's blank trailing
    /// rows) are dropped. When a deposit is taken and a till is open, an
    /// income movement is written in the same transaction.
    pub async fn create(
        &self,
        draft: &WorkOrderDraft,
        operator: &str,
    ) -> DbResult<WorkOrderWithServices> {
        let services = kept_services(&draft.services);
        let services_total: i64 = services.iter().map(|s| s.price_cents).sum();
        let deposit = draft.deposit_cents.unwrap_or(0);
        let now = Utc::now();

        let work_order = WorkOrder {
            id: Uuid::new_v4().to_string(),
            vehicle: draft.vehicle.trim().to_string(),
            plate: draft.plate.clone(),
            mileage: draft.mileage,
            received_at: now,
            deposit_cents: draft.deposit_cents,
            services_total_cents: services_total,
            balance_due_cents: services_total - deposit,
            status: draft.status.unwrap_or_default(),
            notes: draft.notes.clone(),
            created_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO work_orders (
                id, vehicle, plate, mileage, received_at, deposit_cents,
                services_total_cents, balance_due_cents, status, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&work_order.id)
        .bind(&work_order.vehicle)
        .bind(&work_order.plate)
        .bind(work_order.mileage)
        .bind(work_order.received_at)
        .bind(work_order.deposit_cents)
        .bind(work_order.services_total_cents)
        .bind(work_order.balance_due_cents)
        .bind(work_order.status)
        .bind(&work_order.notes)
        .bind(work_order.created_at)
        .execute(&mut *tx)
        .await?;

        let inserted = insert_services(&mut tx, &work_order.id, &services).await?;

        if deposit > 0 {
            let open_till =
                sqlx::query_as::<_, Till>("SELECT * FROM tills WHERE closed_at IS NULL")
                    .fetch_optional(&mut *tx)
                    .await?;

            if let Some(till) = open_till {
                let method = draft.deposit_method.unwrap_or(PaymentMethod::Cash);
                sqlx::query(
                    r#"
                    INSERT INTO till_movements (
                        id, till_id, occurred_at, kind, method, amount_cents,
                        description, sale_id, work_order_id, recorded_by
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?9)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&till.id)
                .bind(now)
                .bind(MovementKind::Income)
                .bind(method)
                .bind(deposit)
                .bind(format!("Work order {} deposit", work_order.id))
                .bind(&work_order.id)
                .bind(operator)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        info!(
            work_order_id = %work_order.id,
            plate = %work_order.plate,
            services = inserted.len(),
            deposit = deposit,
            "work order created"
        );

        Ok(WorkOrderWithServices {
            work_order,
            services: inserted,
        })
    }

    /// Updates a work order, replacing its services wholesale and
    /// recomputing the totals.
    pub async fn update(
        &self,
        id: &str,
        draft: &WorkOrderDraft,
    ) -> DbResult<WorkOrderWithServices> {
        let services = kept_services(&draft.services);
        let services_total: i64 = services.iter().map(|s| s.price_cents).sum();
        let deposit = draft.deposit_cents.unwrap_or(0);

        let mut tx = self.pool.begin().await?;

        let existing =
            sqlx::query_as::<_, WorkOrder>("SELECT * FROM work_orders WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("work order", id))?;

        let status = draft.status.unwrap_or(existing.status);

        sqlx::query(
            r#"
            UPDATE work_orders
            SET vehicle = ?2, plate = ?3, mileage = ?4, deposit_cents = ?5,
                services_total_cents = ?6, balance_due_cents = ?7, status = ?8, notes = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(draft.vehicle.trim())
        .bind(&draft.plate)
        .bind(draft.mileage)
        .bind(draft.deposit_cents)
        .bind(services_total)
        .bind(services_total - deposit)
        .bind(status)
        .bind(&draft.notes)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM work_order_services WHERE work_order_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let inserted = insert_services(&mut tx, id, &services).await?;

        let work_order =
            sqlx::query_as::<_, WorkOrder>("SELECT * FROM work_orders WHERE id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        info!(work_order_id = %id, "work order updated");

        Ok(WorkOrderWithServices {
            work_order,
            services: inserted,
        })
    }

    /// Deletes a work order. Services and till movements referencing it
    /// go with it (cascade).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM work_orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("work order", id));
        }

        info!(work_order_id = %id, "work order deleted");
        Ok(())
    }

    /// Gets a work order with its services.
    pub async fn get(&self, id: &str) -> DbResult<Option<WorkOrderWithServices>> {
        let work_order =
            sqlx::query_as::<_, WorkOrder>("SELECT * FROM work_orders WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(work_order) = work_order else {
            return Ok(None);
        };

        let services = sqlx::query_as::<_, WorkOrderService>(
            "SELECT * FROM work_order_services WHERE work_order_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(WorkOrderWithServices {
            work_order,
            services,
        }))
    }

    /// Lists work orders newest first, with services attached.
    pub async fn list(&self) -> DbResult<Vec<WorkOrderWithServices>> {
        let orders = sqlx::query_as::<_, WorkOrder>(
            "SELECT * FROM work_orders ORDER BY received_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(orders.len());
        for work_order in orders {
            let services = sqlx::query_as::<_, WorkOrderService>(
                "SELECT * FROM work_order_services WHERE work_order_id = ?1",
            )
            .bind(&work_order.id)
            .fetch_all(&self.pool)
            .await?;
            result.push(WorkOrderWithServices {
                work_order,
                services,
            });
        }

        Ok(result)
    }
}

/// Drops service rows with empty descriptions.
fn kept_services(services: &[WorkOrderServiceDraft]) -> Vec<WorkOrderServiceDraft> {
    services
        .iter()
        .filter(|s| !s.description.trim().is_empty())
        .cloned()
        .collect()
}

async fn insert_services(
    tx: &mut Transaction<'_, Sqlite>,
    work_order_id: &str,
    services: &[WorkOrderServiceDraft],
) -> DbResult<Vec<WorkOrderService>> {
    let mut inserted = Vec::with_capacity(services.len());

    for service in services {
        let row = WorkOrderService {
            id: Uuid::new_v4().to_string(),
            work_order_id: work_order_id.to_string(),
            description: service.description.trim().to_string(),
            price_cents: service.price_cents,
            completed: service.completed,
        };

        sqlx::query(
            r#"
            INSERT INTO work_order_services (id, work_order_id, description, price_cents, completed)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&row.id)
        .bind(&row.work_order_id)
        .bind(&row.description)
        .bind(row.price_cents)
        .bind(row.completed)
        .execute(&mut **tx)
        .await?;

        inserted.push(row);
    }

    Ok(inserted)
}

// =============================================================================
// Unit Tests
// =============================================================================
