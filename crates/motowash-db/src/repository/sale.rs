//! # Sale Repository
//!
//! Database operations for sales, their lines, payment allocations and
//! the till movements they produce.
//!
//! ## The Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     create() sequence                               │
//! │                                                                     │
//! │  BEGIN                                                              │
//! │    1. find the open till (sale proceeds without one)                │
//! │    2. per line: look up product by name, case-insensitively         │
//! │         missing product ──► abort                                   │
//! │         stock < quantity ─► abort                                   │
//! │         stock -= quantity                                           │
//! │    3. insert sale, lines (cost snapshot), payment allocations       │
//! │    4. open till? insert one income movement per payment             │
//! │  COMMIT                                                             │
//! │                                                                     │
//! │  Any failure rolls the whole sequence back: stock, sale rows and    │
//! │  till ledger stay consistent with each other.                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use motowash_core::sale::merge_lines;
use motowash_core::{
    CoreError, MovementKind, Product, Sale, SaleDraft, SaleLine, SalePayment, Till,
};

/// A sale with its lines and payment allocations attached.
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithDetails {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
    pub payments: Vec<SalePayment>,
}

/// Optional filters for listing sales.
///
/// Date wins over plate when both are given, matching the search form.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    /// Calendar date of the sale (UTC).
    pub date: Option<NaiveDate>,
    /// Plate substring.
    pub plate: Option<String>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a sale with stock control.
    ///
    /// The draft must already be validated (`validation::validate_sale`);
    /// this method re-checks stock inside the transaction because the
    /// check races with concurrent sales.
    pub async fn create(&self, draft: &SaleDraft, operator: &str) -> DbResult<SaleWithDetails> {
        let lines = merge_lines(draft.lines.clone());
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let open_till = fetch_open_till(&mut tx).await?;

        // Deduct stock line by line; any failure aborts the transaction.
        let mut cost_snapshots: HashMap<String, i64> = HashMap::new();
        for line in &lines {
            let product = deduct_stock(&mut tx, &line.product_name, line.quantity).await?;
            cost_snapshots.insert(line.product_name.to_lowercase(), product.cost_cents);
        }

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            occurred_at: now,
            plate: draft.plate.clone(),
            mileage: draft.mileage,
            discount_bps: draft.discount_bps,
            labor_cents: draft.labor_cents,
            customer_name: draft.customer_name.clone(),
            customer_id_number: draft.customer_id_number.clone(),
            customer_phone: draft.customer_phone.clone(),
            till_id: open_till.as_ref().map(|t| t.id.clone()),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, occurred_at, plate, mileage, discount_bps, labor_cents,
                customer_name, customer_id_number, customer_phone, till_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.occurred_at)
        .bind(&sale.plate)
        .bind(sale.mileage)
        .bind(sale.discount_bps)
        .bind(sale.labor_cents)
        .bind(&sale.customer_name)
        .bind(&sale.customer_id_number)
        .bind(&sale.customer_phone)
        .bind(&sale.till_id)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        let mut inserted_lines = Vec::with_capacity(lines.len());
        for line in &lines {
            let unit_cost = cost_snapshots
                .get(&line.product_name.to_lowercase())
                .copied()
                .unwrap_or(0);
            let row = SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                unit_cost_cents: unit_cost,
            };
            insert_line(&mut tx, &row).await?;
            inserted_lines.push(row);
        }

        let mut inserted_payments = Vec::with_capacity(draft.payments.len());
        for payment in &draft.payments {
            let row = SalePayment {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                method: payment.method,
                amount_cents: payment.amount_cents,
            };
            insert_payment(&mut tx, &row).await?;
            inserted_payments.push(row);
        }

        // One income movement per payment allocation, only when a till
        // is open. A sale without a till simply carries no ledger entry.
        if let Some(till) = &open_till {
            for payment in &inserted_payments {
                sqlx::query(
                    r#"
                    INSERT INTO till_movements (
                        id, till_id, occurred_at, kind, method, amount_cents,
                        description, sale_id, work_order_id, recorded_by
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&till.id)
                .bind(now)
                .bind(MovementKind::Income)
                .bind(payment.method)
                .bind(payment.amount_cents)
                .bind(format!("Sale {} - {}", sale.id, payment.method))
                .bind(&sale.id)
                .bind(operator)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            plate = %sale.plate,
            lines = inserted_lines.len(),
            till = ?sale.till_id,
            "sale created"
        );

        Ok(SaleWithDetails {
            sale,
            lines: inserted_lines,
            payments: inserted_payments,
        })
    }

    /// Updates a sale, adjusting stock by the per-product quantity
    /// difference and replacing lines and payments wholesale.
    ///
    /// Rejected when the sale belongs to a closed till: those figures are
    /// already reconciled.
    pub async fn update(&self, id: &str, draft: &SaleDraft) -> DbResult<SaleWithDetails> {
        let lines = merge_lines(draft.lines.clone());

        let mut tx = self.pool.begin().await?;

        let existing = fetch_sale(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("sale", id))?;
        ensure_till_open(&mut tx, existing.till_id.as_deref()).await?;

        let old_lines = fetch_lines(&mut tx, id).await?;

        // Per-product quantity deltas: positive deducts, negative restores.
        let mut deltas: HashMap<String, (String, i64)> = HashMap::new();
        for line in &lines {
            let entry = deltas
                .entry(line.product_name.to_lowercase())
                .or_insert_with(|| (line.product_name.clone(), 0));
            entry.1 += line.quantity;
        }
        for line in &old_lines {
            let entry = deltas
                .entry(line.product_name.to_lowercase())
                .or_insert_with(|| (line.product_name.clone(), 0));
            entry.1 -= line.quantity;
        }

        let mut cost_snapshots: HashMap<String, i64> = HashMap::new();
        for line in &old_lines {
            cost_snapshots.insert(line.product_name.to_lowercase(), line.unit_cost_cents);
        }

        for (key, (name, delta)) in &deltas {
            if *delta > 0 {
                let product = deduct_stock(&mut tx, name, *delta).await?;
                cost_snapshots.insert(key.clone(), product.cost_cents);
            } else if *delta < 0 {
                // Removed or reduced lines put units back on the shelf.
                // A product since retired from inventory is skipped, as
                // on delete.
                restore_stock(&mut tx, name, -*delta).await?;
            }
        }

        sqlx::query(
            r#"
            UPDATE sales
            SET plate = ?2, mileage = ?3, discount_bps = ?4, labor_cents = ?5,
                customer_name = ?6, customer_id_number = ?7, customer_phone = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.plate)
        .bind(draft.mileage)
        .bind(draft.discount_bps)
        .bind(draft.labor_cents)
        .bind(&draft.customer_name)
        .bind(&draft.customer_id_number)
        .bind(&draft.customer_phone)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM sale_lines WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sale_payments WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let mut inserted_lines = Vec::with_capacity(lines.len());
        for line in &lines {
            let unit_cost = cost_snapshots
                .get(&line.product_name.to_lowercase())
                .copied()
                .unwrap_or(0);
            let row = SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: id.to_string(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                unit_cost_cents: unit_cost,
            };
            insert_line(&mut tx, &row).await?;
            inserted_lines.push(row);
        }

        let mut inserted_payments = Vec::with_capacity(draft.payments.len());
        for payment in &draft.payments {
            let row = SalePayment {
                id: Uuid::new_v4().to_string(),
                sale_id: id.to_string(),
                method: payment.method,
                amount_cents: payment.amount_cents,
            };
            insert_payment(&mut tx, &row).await?;
            inserted_payments.push(row);
        }

        let sale = fetch_sale(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("sale", id))?;

        tx.commit().await?;

        info!(sale_id = %id, "sale updated");

        Ok(SaleWithDetails {
            sale,
            lines: inserted_lines,
            payments: inserted_payments,
        })
    }

    /// Deletes a sale: restores stock for every line, removes the sale's
    /// till movements, then the sale itself (lines and payments cascade).
    ///
    /// Rejected when the sale belongs to a closed till.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let sale = fetch_sale(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("sale", id))?;
        ensure_till_open(&mut tx, sale.till_id.as_deref()).await?;

        let lines = fetch_lines(&mut tx, id).await?;
        for line in &lines {
            restore_stock(&mut tx, &line.product_name, line.quantity).await?;
        }

        sqlx::query("DELETE FROM till_movements WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(sale_id = %id, "sale deleted, stock restored");
        Ok(())
    }

    /// Gets a sale with lines and payments.
    pub async fn get(&self, id: &str) -> DbResult<Option<SaleWithDetails>> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, SaleLine>(
            "SELECT * FROM sale_lines WHERE sale_id = ?1 ORDER BY product_name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let payments = sqlx::query_as::<_, SalePayment>(
            "SELECT * FROM sale_payments WHERE sale_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SaleWithDetails {
            sale,
            lines,
            payments,
        }))
    }

    /// Lists sales newest first, optionally filtered by calendar date or
    /// plate substring.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<SaleWithDetails>> {
        debug!(?filter, "listing sales");

        let sales = if let Some(date) = filter.date {
            sqlx::query_as::<_, Sale>(
                "SELECT * FROM sales WHERE date(occurred_at) = ?1 ORDER BY occurred_at DESC",
            )
            .bind(date.to_string())
            .fetch_all(&self.pool)
            .await?
        } else if let Some(plate) = filter.plate.as_deref().filter(|p| !p.is_empty()) {
            sqlx::query_as::<_, Sale>(
                "SELECT * FROM sales WHERE plate LIKE ?1 ORDER BY occurred_at DESC",
            )
            .bind(format!("%{}%", plate))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Sale>("SELECT * FROM sales ORDER BY occurred_at DESC")
                .fetch_all(&self.pool)
                .await?
        };

        let mut result = Vec::with_capacity(sales.len());
        for sale in sales {
            let lines = sqlx::query_as::<_, SaleLine>(
                "SELECT * FROM sale_lines WHERE sale_id = ?1 ORDER BY product_name",
            )
            .bind(&sale.id)
            .fetch_all(&self.pool)
            .await?;
            let payments = sqlx::query_as::<_, SalePayment>(
                "SELECT * FROM sale_payments WHERE sale_id = ?1",
            )
            .bind(&sale.id)
            .fetch_all(&self.pool)
            .await?;
            result.push(SaleWithDetails {
                sale,
                lines,
                payments,
            });
        }

        Ok(result)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn fetch_open_till(tx: &mut Transaction<'_, Sqlite>) -> DbResult<Option<Till>> {
    let till = sqlx::query_as::<_, Till>("SELECT * FROM tills WHERE closed_at IS NULL")
        .fetch_optional(&mut **tx)
        .await?;
    Ok(till)
}

async fn fetch_sale(tx: &mut Transaction<'_, Sqlite>, id: &str) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(sale)
}

async fn fetch_lines(tx: &mut Transaction<'_, Sqlite>, sale_id: &str) -> DbResult<Vec<SaleLine>> {
    let lines = sqlx::query_as::<_, SaleLine>("SELECT * FROM sale_lines WHERE sale_id = ?1")
        .bind(sale_id)
        .fetch_all(&mut **tx)
        .await?;
    Ok(lines)
}

/// Fails when the sale is attached to a till that has since closed.
async fn ensure_till_open(
    tx: &mut Transaction<'_, Sqlite>,
    till_id: Option<&str>,
) -> DbResult<()> {
    let Some(till_id) = till_id else {
        return Ok(());
    };

    let till = sqlx::query_as::<_, Till>("SELECT * FROM tills WHERE id = ?1")
        .bind(till_id)
        .fetch_optional(&mut **tx)
        .await?;

    match till {
        Some(till) if !till.is_open() => Err(CoreError::TillClosed(till.id).into()),
        _ => Ok(()),
    }
}

/// Looks up a product by name and deducts `quantity` from its stock.
/// The product must exist and have enough units on hand.
async fn deduct_stock(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    quantity: i64,
) -> DbResult<Product> {
    let product =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE name = ?1 COLLATE NOCASE")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(name.to_string()))?;

    if !product.can_sell(quantity) {
        return Err(CoreError::InsufficientStock {
            name: product.name,
            available: product.stock,
            requested: quantity,
        }
        .into());
    }

    sqlx::query("UPDATE products SET stock = stock - ?2, updated_at = ?3 WHERE id = ?1")
        .bind(&product.id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

    Ok(product)
}

/// Puts `quantity` units back. A product no longer in inventory is
/// skipped silently, mirroring delete-with-restore semantics.
async fn restore_stock(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    quantity: i64,
) -> DbResult<()> {
    sqlx::query(
        "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE name = ?1 COLLATE NOCASE",
    )
    .bind(name)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_line(tx: &mut Transaction<'_, Sqlite>, line: &SaleLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_lines (id, sale_id, product_name, quantity, unit_price_cents, unit_cost_cents)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&line.id)
    .bind(&line.sale_id)
    .bind(&line.product_name)
    .bind(line.quantity)
    .bind(line.unit_price_cents)
    .bind(line.unit_cost_cents)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_payment(tx: &mut Transaction<'_, Sqlite>, payment: &SalePayment) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_payments (id, sale_id, method, amount_cents)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.sale_id)
    .bind(payment.method)
    .bind(payment.amount_cents)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::ProductInput;
    use motowash_core::{PaymentDraft, PaymentMethod, SaleLineDraft};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, stock: i64, price: i64) {
        db.products()
            .create(&ProductInput {
                name: name.to_string(),
                stock,
                price_cents: price,
                cost_cents: price / 2,
            })
            .await
            .unwrap();
    }

    fn draft(lines: Vec<SaleLineDraft>, payments: Vec<PaymentDraft>) -> SaleDraft {
        SaleDraft {
            plate: "ABC123".to_string(),
            mileage: 12000,
            discount_bps: 0,
            labor_cents: 0,
            customer_name: None,
            customer_id_number: None,
            customer_phone: None,
            lines,
            payments,
        }
    }

    fn line(name: &str, qty: i64, price: i64) -> SaleLineDraft {
        SaleLineDraft {
            product_name: name.to_string(),
            quantity: qty,
            unit_price_cents: price,
        }
    }

    fn cash(amount: i64) -> PaymentDraft {
        PaymentDraft {
            method: PaymentMethod::Cash,
            amount_cents: amount,
        }
    }

    #[tokio::test]
    async fn test_create_deducts_stock_and_snapshots_cost() {
        let db = test_db().await;
        seed_product(&db, "Wax", 5, 500).await;

        let created = db
            .sales()
            .create(&draft(vec![line("wax", 2, 500)], vec![cash(1000)]), "ana")
            .await
            .unwrap();

        assert_eq!(created.lines.len(), 1);
        assert_eq!(created.lines[0].unit_cost_cents, 250);
        // No till open: sale carries no till reference.
        assert!(created.sale.till_id.is_none());

        let product = db.products().find_by_name("Wax").await.unwrap().unwrap();
        assert_eq!(product.stock, 3);
    }

    #[tokio::test]
    async fn test_create_merges_duplicate_lines() {
        let db = test_db().await;
        seed_product(&db, "Wax", 5, 500).await;

        let created = db
            .sales()
            .create(
                &draft(
                    vec![line("Wax", 2, 500), line("wax", 1, 500)],
                    vec![cash(1500)],
                ),
                "ana",
            )
            .await
            .unwrap();

        assert_eq!(created.lines.len(), 1);
        assert_eq!(created.lines[0].quantity, 3);

        let product = db.products().find_by_name("Wax").await.unwrap().unwrap();
        assert_eq!(product.stock, 2);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_everything_back() {
        let db = test_db().await;
        seed_product(&db, "Wax", 5, 500).await;
        seed_product(&db, "Oil", 1, 1500).await;

        let err = db
            .sales()
            .create(
                &draft(
                    // First line would succeed; second aborts.
                    vec![line("Wax", 2, 500), line("Oil", 3, 1500)],
                    vec![cash(5500)],
                ),
                "ana",
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));

        // The wax deduction was rolled back along with everything else.
        let wax = db.products().find_by_name("Wax").await.unwrap().unwrap();
        assert_eq!(wax.stock, 5);
        assert!(db.sales().list(&SaleFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_aborts() {
        let db = test_db().await;

        let err = db
            .sales()
            .create(&draft(vec![line("Ghost", 1, 100)], vec![cash(100)]), "ana")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_with_open_till_writes_one_movement_per_payment() {
        let db = test_db().await;
        seed_product(&db, "Wax", 5, 500).await;
        let till = db.tills().open(10000, "ana").await.unwrap();

        let created = db
            .sales()
            .create(
                &draft(
                    vec![line("Wax", 2, 500)],
                    vec![
                        cash(400),
                        PaymentDraft {
                            method: PaymentMethod::Transfer,
                            amount_cents: 600,
                        },
                    ],
                ),
                "ana",
            )
            .await
            .unwrap();

        assert_eq!(created.sale.till_id.as_deref(), Some(till.id.as_str()));

        let movements = db.tills().movements(&till.id).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert!(movements.iter().all(|m| m.kind == MovementKind::Income));
        assert!(movements
            .iter()
            .all(|m| m.sale_id.as_deref() == Some(created.sale.id.as_str())));
        let total: i64 = movements.iter().map(|m| m.amount_cents).sum();
        assert_eq!(total, 1000);
    }

    #[tokio::test]
    async fn test_update_adjusts_stock_by_difference() {
        let db = test_db().await;
        seed_product(&db, "Wax", 10, 500).await;
        seed_product(&db, "Oil", 10, 1000).await;

        let created = db
            .sales()
            .create(
                &draft(
                    vec![line("Wax", 4, 500), line("Oil", 1, 1000)],
                    vec![cash(3000)],
                ),
                "ana",
            )
            .await
            .unwrap();

        // Wax 4 → 1 (restores 3), Oil dropped (restores 1).
        db.sales()
            .update(
                &created.sale.id,
                &draft(vec![line("Wax", 1, 500)], vec![cash(500)]),
            )
            .await
            .unwrap();

        let wax = db.products().find_by_name("Wax").await.unwrap().unwrap();
        let oil = db.products().find_by_name("Oil").await.unwrap().unwrap();
        assert_eq!(wax.stock, 9);
        assert_eq!(oil.stock, 10);

        let reloaded = db.sales().get(&created.sale.id).await.unwrap().unwrap();
        assert_eq!(reloaded.lines.len(), 1);
        assert_eq!(reloaded.payments.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_restores_stock_and_removes_movements() {
        let db = test_db().await;
        seed_product(&db, "Wax", 5, 500).await;
        let till = db.tills().open(0, "ana").await.unwrap();

        let created = db
            .sales()
            .create(&draft(vec![line("Wax", 2, 500)], vec![cash(1000)]), "ana")
            .await
            .unwrap();

        db.sales().delete(&created.sale.id).await.unwrap();

        let wax = db.products().find_by_name("Wax").await.unwrap().unwrap();
        assert_eq!(wax.stock, 5);
        assert!(db.tills().movements(&till.id).await.unwrap().is_empty());
        assert!(db.sales().get(&created.sale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_till_locks_sale() {
        let db = test_db().await;
        seed_product(&db, "Wax", 5, 500).await;
        let till = db.tills().open(0, "ana").await.unwrap();

        let created = db
            .sales()
            .create(&draft(vec![line("Wax", 1, 500)], vec![cash(500)]), "ana")
            .await
            .unwrap();

        db.tills().close(&till.id, 500, 0, "ana").await.unwrap();

        let err = db.sales().delete(&created.sale.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::TillClosed(_))));

        let err = db
            .sales()
            .update(
                &created.sale.id,
                &draft(vec![line("Wax", 2, 500)], vec![cash(1000)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::TillClosed(_))));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        seed_product(&db, "Wax", 10, 500).await;

        let mut a = draft(vec![line("Wax", 1, 500)], vec![cash(500)]);
        a.plate = "AAA111".to_string();
        db.sales().create(&a, "ana").await.unwrap();

        let mut b = draft(vec![line("Wax", 1, 500)], vec![cash(500)]);
        b.plate = "BBB222".to_string();
        db.sales().create(&b, "ana").await.unwrap();

        let by_plate = db
            .sales()
            .list(&SaleFilter {
                date: None,
                plate: Some("AAA".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(by_plate.len(), 1);
        assert_eq!(by_plate[0].sale.plate, "AAA111");

        let today = Utc::now().date_naive();
        let by_date = db
            .sales()
            .list(&SaleFilter {
                date: Some(today),
                plate: None,
            })
            .await
            .unwrap();
        assert_eq!(by_date.len(), 2);
    }
}
