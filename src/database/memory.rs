use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::invoice::{Invoice, InvoiceChanges, NewInvoice};
use crate::database::store::InvoiceStore;

/// Process-local `InvoiceStore`.
///
/// Mirrors the Postgres store's observable behaviour: ids are v4 UUIDs, and
/// ids or customer ids that are not UUID text fail the statement instead of
/// matching nothing.
#[derive(Clone, Default)]
pub struct MemoryInvoiceStore {
    rows: Arc<RwLock<HashMap<String, Invoice>>>,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn invalid_uuid(column: &str, value: &str) -> DatabaseError {
    DatabaseError::QueryError(format!("invalid input syntax for type uuid in {}: \"{}\"", column, value))
}

fn check_uuid(column: &str, value: &str) -> Result<(), DatabaseError> {
    Uuid::parse_str(value).map(|_| ()).map_err(|_| invalid_uuid(column, value))
}

/// Stored ids are the canonical lowercase hyphenated form
fn canonical(id: &str) -> Result<String, DatabaseError> {
    Uuid::parse_str(id).map(|u| u.to_string()).map_err(|_| invalid_uuid("id", id))
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn insert(&self, invoice: &NewInvoice) -> Result<String, DatabaseError> {
        check_uuid("customer_id", &invoice.customer_id)?;

        let id = Uuid::new_v4().to_string();
        let row = Invoice {
            id: id.clone(),
            customer_id: invoice.customer_id.clone(),
            amount: invoice.amount_in_cents,
            status: invoice.status,
            date: invoice.date,
        };
        self.rows.write().await.insert(id.clone(), row);
        Ok(id)
    }

    async fn update(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, DatabaseError> {
        let id = canonical(id)?;
        check_uuid("customer_id", &changes.customer_id)?;

        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(row) => {
                row.customer_id = changes.customer_id.clone();
                row.amount = changes.amount_in_cents;
                row.status = changes.status;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &str) -> Result<u64, DatabaseError> {
        let id = canonical(id)?;
        Ok(self.rows.write().await.remove(&id).map_or(0, |_| 1))
    }

    async fn list(&self) -> Result<Vec<Invoice>, DatabaseError> {
        let mut invoices: Vec<Invoice> = self.rows.read().await.values().cloned().collect();
        invoices.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(invoices)
    }

    async fn find(&self, id: &str) -> Result<Option<Invoice>, DatabaseError> {
        let Ok(id) = canonical(id) else {
            return Ok(None);
        };
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
