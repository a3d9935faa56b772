//! # Till Repository
//!
//! Database operations for till sessions and their movement ledger.
//!
//! ## Session Lifecycle
//! ```text
//! open() ──► movements accumulate ──► summary() ──► close()
//!   │          (sales, deposits,        pure          stores counted
//!   │           manual expenses)        arithmetic    balances
//!   └── rejected while another till is open
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use motowash_core::{
    CoreError, MovementKind, PaymentMethod, Till, TillMovement, TillSummary,
};

/// A till with its ledger and computed close-out summary.
#[derive(Debug, Clone, Serialize)]
pub struct TillWithSummary {
    pub till: Till,
    pub movements: Vec<TillMovement>,
    pub summary: TillSummary,
}

/// Repository for till database operations.
#[derive(Debug, Clone)]
pub struct TillRepository {
    pool: SqlitePool,
}

impl TillRepository {
    /// Creates a new TillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TillRepository { pool }
    }

    /// Opens a new till session.
    ///
    /// Only one till may be open at a time; the check runs inside a
    /// transaction and a partial unique index backs it up.
    pub async fn open(&self, opening_cash_cents: i64, operator: &str) -> DbResult<Till> {
        let mut tx = self.pool.begin().await?;

        let already_open =
            sqlx::query_as::<_, Till>("SELECT * FROM tills WHERE closed_at IS NULL")
                .fetch_optional(&mut *tx)
                .await?;
        if already_open.is_some() {
            return Err(CoreError::TillAlreadyOpen.into());
        }

        let till = Till {
            id: Uuid::new_v4().to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_cash_cents,
            closing_cash_cents: 0,
            closing_transfer_cents: 0,
            opened_by: operator.to_string(),
            closed_by: None,
        };

        sqlx::query(
            r#"
            INSERT INTO tills (
                id, opened_at, closed_at, opening_cash_cents,
                closing_cash_cents, closing_transfer_cents, opened_by, closed_by
            ) VALUES (?1, ?2, NULL, ?3, 0, 0, ?4, NULL)
            "#,
        )
        .bind(&till.id)
        .bind(till.opened_at)
        .bind(till.opening_cash_cents)
        .bind(&till.opened_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(till_id = %till.id, opening_cash = till.opening_cash_cents, operator = %operator, "till opened");
        Ok(till)
    }

    /// Returns the currently open till, if any.
    pub async fn current_open(&self) -> DbResult<Option<Till>> {
        let till = sqlx::query_as::<_, Till>("SELECT * FROM tills WHERE closed_at IS NULL")
            .fetch_optional(&self.pool)
            .await?;
        Ok(till)
    }

    /// Gets a till by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Till>> {
        let till = sqlx::query_as::<_, Till>("SELECT * FROM tills WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(till)
    }

    /// Lists all till sessions, newest first.
    pub async fn list(&self) -> DbResult<Vec<Till>> {
        let tills = sqlx::query_as::<_, Till>("SELECT * FROM tills ORDER BY opened_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(tills)
    }

    /// Lists a till's movements, oldest first.
    pub async fn movements(&self, till_id: &str) -> DbResult<Vec<TillMovement>> {
        let movements = sqlx::query_as::<_, TillMovement>(
            "SELECT * FROM till_movements WHERE till_id = ?1 ORDER BY occurred_at",
        )
        .bind(till_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    /// Records a manual expense against an open till.
    pub async fn add_expense(
        &self,
        till_id: &str,
        method: PaymentMethod,
        amount_cents: i64,
        description: &str,
        operator: &str,
    ) -> DbResult<TillMovement> {
        let till = self
            .get(till_id)
            .await?
            .ok_or_else(|| DbError::not_found("till", till_id))?;
        if !till.is_open() {
            return Err(CoreError::TillClosed(till.id).into());
        }

        let movement = TillMovement {
            id: Uuid::new_v4().to_string(),
            till_id: till_id.to_string(),
            occurred_at: Utc::now(),
            kind: MovementKind::Expense,
            method,
            amount_cents,
            description: description.to_string(),
            sale_id: None,
            work_order_id: None,
            recorded_by: operator.to_string(),
        };

        sqlx::query(
            r#"
            INSERT INTO till_movements (
                id, till_id, occurred_at, kind, method, amount_cents,
                description, sale_id, work_order_id, recorded_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, NULL, ?8)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.till_id)
        .bind(movement.occurred_at)
        .bind(movement.kind)
        .bind(movement.method)
        .bind(movement.amount_cents)
        .bind(&movement.description)
        .bind(&movement.recorded_by)
        .execute(&self.pool)
        .await?;

        info!(till_id = %till_id, amount = amount_cents, "expense recorded");
        Ok(movement)
    }

    /// Computes the close-out summary for a till.
    pub async fn summary(&self, till_id: &str) -> DbResult<TillWithSummary> {
        let till = self
            .get(till_id)
            .await?
            .ok_or_else(|| DbError::not_found("till", till_id))?;
        let movements = self.movements(till_id).await?;
        let summary = TillSummary::compute(&till, &movements);

        Ok(TillWithSummary {
            till,
            movements,
            summary,
        })
    }

    /// Closes a till, storing the counted balances.
    pub async fn close(
        &self,
        till_id: &str,
        closing_cash_cents: i64,
        closing_transfer_cents: i64,
        operator: &str,
    ) -> DbResult<Till> {
        let till = self
            .get(till_id)
            .await?
            .ok_or_else(|| DbError::not_found("till", till_id))?;
        if !till.is_open() {
            return Err(CoreError::TillClosed(till.id).into());
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE tills
            SET closed_at = ?2, closing_cash_cents = ?3,
                closing_transfer_cents = ?4, closed_by = ?5
            WHERE id = ?1 AND closed_at IS NULL
            "#,
        )
        .bind(till_id)
        .bind(now)
        .bind(closing_cash_cents)
        .bind(closing_transfer_cents)
        .bind(operator)
        .execute(&self.pool)
        .await?;

        info!(till_id = %till_id, closing_cash = closing_cash_cents, operator = %operator, "till closed");

        self.get(till_id)
            .await?
            .ok_or_else(|| DbError::not_found("till", till_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_only_one_open_till() {
        let db = test_db().await;
        let repo = db.tills();

        let till = repo.open(5000, "ana").await.unwrap();
        let err = repo.open(0, "luis").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::TillAlreadyOpen)));

        repo.close(&till.id, 5000, 0, "ana").await.unwrap();
        assert!(repo.open(0, "luis").await.is_ok());
    }

    #[tokio::test]
    async fn test_close_stores_counted_balances() {
        let db = test_db().await;
        let repo = db.tills();

        let till = repo.open(5000, "ana").await.unwrap();
        let closed = repo.close(&till.id, 7500, 2000, "luis").await.unwrap();

        assert!(!closed.is_open());
        assert_eq!(closed.closing_cash_cents, 7500);
        assert_eq!(closed.closing_transfer_cents, 2000);
        assert_eq!(closed.closed_by.as_deref(), Some("luis"));

        // Closing twice is rejected.
        let err = repo.close(&till.id, 0, 0, "ana").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::TillClosed(_))));
    }

    #[tokio::test]
    async fn test_expense_requires_open_till() {
        let db = test_db().await;
        let repo = db.tills();

        let till = repo.open(10000, "ana").await.unwrap();
        repo.add_expense(&till.id, PaymentMethod::Cash, 1500, "Soap refill", "ana")
            .await
            .unwrap();

        let with_summary = repo.summary(&till.id).await.unwrap();
        assert_eq!(with_summary.summary.cash_expenses.cents(), 1500);
        assert_eq!(with_summary.summary.expected_cash.cents(), 8500);

        repo.close(&till.id, 8500, 0, "ana").await.unwrap();
        let err = repo
            .add_expense(&till.id, PaymentMethod::Cash, 100, "Late", "ana")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::TillClosed(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = test_db().await;
        let repo = db.tills();

        let first = repo.open(0, "ana").await.unwrap();
        repo.close(&first.id, 0, 0, "ana").await.unwrap();
        let second = repo.open(0, "ana").await.unwrap();

        let tills = repo.list().await.unwrap();
        assert_eq!(tills.len(), 2);
        assert_eq!(tills[0].id, second.id);
    }
}
