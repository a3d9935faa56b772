//! Invoice repository. Plain CRUD; invoices have no linkage to the
//! rest of the schema.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use motowash_core::Invoice;

/// Fields accepted when creating an invoice.
#[derive(Debug, Clone)]
pub struct InvoiceInput {
    pub number: String,
    pub customer: String,
    pub total_cents: i64,
    pub notes: Option<String>,
}

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Creates an invoice.
    pub async fn create(&self, input: &InvoiceInput) -> DbResult<Invoice> {
        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            number: input.number.clone(),
            customer: input.customer.clone(),
            issued_at: Utc::now(),
            total_cents: input.total_cents,
            notes: input.notes.clone(),
        };

        sqlx::query(
            r#"
            INSERT INTO invoices (id, number, customer, issued_at, total_cents, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.number)
        .bind(&invoice.customer)
        .bind(invoice.issued_at)
        .bind(invoice.total_cents)
        .bind(&invoice.notes)
        .execute(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Lists invoices newest first.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        let invoices =
            sqlx::query_as::<_, Invoice>("SELECT * FROM invoices ORDER BY issued_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(invoices)
    }

    /// Gets an invoice by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    /// Deletes an invoice.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("invoice", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_invoice_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.invoices();

        let invoice = repo
            .create(&InvoiceInput {
                number: "F-0001".to_string(),
                customer: "Taller El Norte".to_string(),
                total_cents: 45000,
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert_eq!(
            repo.get(&invoice.id).await.unwrap().unwrap().number,
            "F-0001"
        );

        repo.delete(&invoice.id).await.unwrap();
        assert!(repo.get(&invoice.id).await.unwrap().is_none());
    }
}
