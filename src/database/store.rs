use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::invoice::{Invoice, InvoiceChanges, InvoiceRow, NewInvoice};

/// Persistence boundary for invoices.
///
/// Each call is a single statement; concurrency control belongs to the
/// backing store. `update` and `delete` report the number of rows touched so
/// callers can tell a no-op from a change.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a row and return its store-assigned id
    async fn insert(&self, invoice: &NewInvoice) -> Result<String, DatabaseError>;

    async fn update(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, DatabaseError>;

    async fn delete(&self, id: &str) -> Result<u64, DatabaseError>;

    /// All invoices, newest date first
    async fn list(&self) -> Result<Vec<Invoice>, DatabaseError>;

    async fn find(&self, id: &str) -> Result<Option<Invoice>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// `InvoiceStore` over the Postgres `invoices` table
#[derive(Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_INVOICE: &str =
    "SELECT id::text AS id, customer_id::text AS customer_id, amount, status, date FROM invoices";

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn insert(&self, invoice: &NewInvoice) -> Result<String, DatabaseError> {
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO invoices (customer_id, amount, status, date)
            VALUES ($1::uuid, $2, $3, $4)
            RETURNING id::text
            "#,
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount_in_cents)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = $1::uuid, amount = $2, status = $3
            WHERE id = $4::uuid
            "#,
        )
        .bind(&changes.customer_id)
        .bind(changes.amount_in_cents)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1::uuid")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list(&self) -> Result<Vec<Invoice>, DatabaseError> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!("{} ORDER BY date DESC, id", SELECT_INVOICE))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Invoice::try_from(row).map_err(DatabaseError::QueryError))
            .collect()
    }

    async fn find(&self, id: &str) -> Result<Option<Invoice>, DatabaseError> {
        // A malformed id cannot name a row; skip the round trip
        if Uuid::parse_str(id).is_err() {
            return Ok(None);
        }

        let row: Option<InvoiceRow> = sqlx::query_as(&format!("{} WHERE id = $1::uuid", SELECT_INVOICE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Invoice::try_from(row).map_err(DatabaseError::QueryError))
            .transpose()
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
