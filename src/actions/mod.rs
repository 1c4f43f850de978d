//! Invoice mutations: validate, coerce, persist, revalidate, redirect.
//!
//! Every entry point returns an [`ActionOutcome`]. Validation and store
//! failures are reported to the form; nothing propagates to the caller.

pub mod outcome;
pub mod revalidate;

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::database::{DatabaseError, InvoiceChanges, InvoiceStore, NewInvoice};
use crate::schema::{InvoiceForm, InvoiceSchema, SafeParse, ValidationError};
use crate::types::Operation;

pub use outcome::{ActionMessage, ActionOutcome, FieldMessages, FormState, REQUIRED_FIELD};
pub use revalidate::{Revalidator, ViewCache};

/// Listing page revalidated after every mutation and target of redirects
pub const INVOICES_PATH: &str = "/dashboard/invoices";

pub const DELETED_MESSAGE: &str = "Deleted Invoice.";

#[derive(Debug, Error)]
enum ActionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Clone)]
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    revalidator: Arc<dyn Revalidator>,
}

impl InvoiceActions {
    pub fn new(store: Arc<dyn InvoiceStore>, revalidator: Arc<dyn Revalidator>) -> Self {
        Self { store, revalidator }
    }

    pub fn store(&self) -> &Arc<dyn InvoiceStore> {
        &self.store
    }

    /// Insert a new invoice dated today (UTC)
    pub async fn create_invoice(&self, form: &InvoiceForm) -> ActionOutcome {
        let input = match InvoiceSchema::CREATE.safe_parse(form) {
            SafeParse::Success(input) => input,
            SafeParse::Failure(err) => return Self::invalid(Operation::Create, &err),
        };

        let invoice = NewInvoice {
            amount_in_cents: input.amount_in_cents(),
            customer_id: input.customer_id,
            status: input.status,
            date: today(),
        };

        match self.store.insert(&invoice).await {
            Ok(id) => info!("Created invoice {} ({} cents, {})", id, invoice.amount_in_cents, invoice.status),
            Err(e) => {
                error!("Failed to create invoice: {}", e);
                return ActionOutcome::Failed(FormState::fields(FieldMessages::other(
                    Operation::Create.database_error_message(),
                )));
            }
        }

        self.revalidator.revalidate_path(INVOICES_PATH).await;
        ActionOutcome::Redirect(INVOICES_PATH.to_string())
    }

    /// Replace customer, amount and status of one invoice. `id` and `date`
    /// are left as stored. An id matching no row is a no-op.
    pub async fn update_invoice(&self, id: &str, form: &InvoiceForm) -> ActionOutcome {
        match self.try_update(id, form).await {
            Ok(0) => warn!("Update matched no invoice with id {}", id),
            Ok(_) => info!("Updated invoice {}", id),
            Err(ActionError::Invalid(err)) => return Self::invalid(Operation::Update, &err),
            Err(ActionError::Database(e)) => {
                error!("Failed to update invoice {}: {}", id, e);
                return ActionOutcome::Failed(FormState::text(Operation::Update.database_error_message()));
            }
        }

        self.revalidator.revalidate_path(INVOICES_PATH).await;
        ActionOutcome::Redirect(INVOICES_PATH.to_string())
    }

    async fn try_update(&self, id: &str, form: &InvoiceForm) -> Result<u64, ActionError> {
        let input = InvoiceSchema::UPDATE.parse(form)?;

        let changes = InvoiceChanges {
            amount_in_cents: input.amount_in_cents(),
            customer_id: input.customer_id,
            status: input.status,
        };

        Ok(self.store.update(id, &changes).await?)
    }

    /// Remove one invoice. Deleting an id that matches no row succeeds.
    pub async fn delete_invoice(&self, id: &str) -> ActionOutcome {
        match self.store.delete(id).await {
            Ok(rows) => {
                if rows == 0 {
                    debug!("Delete matched no invoice with id {}", id);
                } else {
                    info!("Deleted invoice {}", id);
                }
                self.revalidator.revalidate_path(INVOICES_PATH).await;
                ActionOutcome::Completed(FormState::text(DELETED_MESSAGE))
            }
            Err(e) => {
                error!("Failed to delete invoice {}: {}", id, e);
                ActionOutcome::Failed(FormState::text(Operation::Delete.database_error_message()))
            }
        }
    }

    fn invalid(operation: Operation, err: &ValidationError) -> ActionOutcome {
        debug!("{} invoice rejected: {}", operation, err);
        ActionOutcome::Invalid(FormState::fields(FieldMessages::from(err)))
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Invoice, InvoiceStatus, MemoryInvoiceStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const CUSTOMER: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";
    const OTHER_CUSTOMER: &str = "cc27c14a-0acf-4f4a-a6c9-d45682c144b9";

    #[derive(Default)]
    struct RecordingRevalidator {
        paths: Mutex<Vec<String>>,
    }

    impl RecordingRevalidator {
        fn paths(&self) -> Vec<String> {
            self.paths.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Revalidator for RecordingRevalidator {
        async fn revalidate_path(&self, path: &str) {
            self.paths.lock().unwrap().push(path.to_string());
        }
    }

    /// Store whose every statement fails
    struct BrokenStore;

    #[async_trait]
    impl InvoiceStore for BrokenStore {
        async fn insert(&self, _: &NewInvoice) -> Result<String, DatabaseError> {
            Err(DatabaseError::QueryError("connection refused".to_string()))
        }
        async fn update(&self, _: &str, _: &InvoiceChanges) -> Result<u64, DatabaseError> {
            Err(DatabaseError::QueryError("connection refused".to_string()))
        }
        async fn delete(&self, _: &str) -> Result<u64, DatabaseError> {
            Err(DatabaseError::QueryError("connection refused".to_string()))
        }
        async fn list(&self) -> Result<Vec<Invoice>, DatabaseError> {
            Err(DatabaseError::QueryError("connection refused".to_string()))
        }
        async fn find(&self, _: &str) -> Result<Option<Invoice>, DatabaseError> {
            Err(DatabaseError::QueryError("connection refused".to_string()))
        }
        async fn health_check(&self) -> Result<(), DatabaseError> {
            Err(DatabaseError::QueryError("connection refused".to_string()))
        }
    }

    fn memory_actions() -> (InvoiceActions, MemoryInvoiceStore, Arc<RecordingRevalidator>) {
        let store = MemoryInvoiceStore::new();
        let revalidator = Arc::new(RecordingRevalidator::default());
        let actions = InvoiceActions::new(Arc::new(store.clone()), revalidator.clone());
        (actions, store, revalidator)
    }

    fn broken_actions() -> (InvoiceActions, Arc<RecordingRevalidator>) {
        let revalidator = Arc::new(RecordingRevalidator::default());
        (InvoiceActions::new(Arc::new(BrokenStore), revalidator.clone()), revalidator)
    }

    async fn only_invoice(store: &MemoryInvoiceStore) -> Invoice {
        let mut all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        all.remove(0)
    }

    #[tokio::test]
    async fn create_inserts_cents_and_today() {
        let (actions, store, revalidator) = memory_actions();

        let outcome = actions.create_invoice(&InvoiceForm::new(CUSTOMER, "12.50", "pending")).await;

        assert_eq!(outcome.redirect_target(), Some(INVOICES_PATH));
        let invoice = only_invoice(&store).await;
        assert_eq!(invoice.amount, 1250);
        assert_eq!(invoice.amount_in_units(), 12.5);
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.customer_id, CUSTOMER);
        assert_eq!(invoice.date, Utc::now().date_naive());
        assert_eq!(revalidator.paths(), vec![INVOICES_PATH]);
    }

    #[tokio::test]
    async fn create_is_not_idempotent() {
        let (actions, store, _) = memory_actions();
        let form = InvoiceForm::new(CUSTOMER, "5", "paid");
        actions.create_invoice(&form).await;
        actions.create_invoice(&form).await;
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn create_with_missing_fields_reports_each_and_inserts_nothing() {
        let (actions, store, revalidator) = memory_actions();

        let outcome = actions
            .create_invoice(&InvoiceForm {
                customer_id: None,
                amount: Some("10".to_string()),
                status: None,
            })
            .await;

        let ActionOutcome::Invalid(state) = outcome else {
            panic!("expected invalid outcome, got {:?}", outcome);
        };
        let messages = state.field_messages().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages.get("customerId"), Some(REQUIRED_FIELD));
        assert_eq!(messages.get("status"), Some(REQUIRED_FIELD));
        assert!(store.is_empty().await);
        assert!(revalidator.paths().is_empty());
    }

    #[tokio::test]
    async fn create_reports_store_failure_as_other() {
        let (actions, revalidator) = broken_actions();

        let outcome = actions.create_invoice(&InvoiceForm::new(CUSTOMER, "1", "paid")).await;

        let ActionOutcome::Failed(state) = outcome else {
            panic!("expected failed outcome, got {:?}", outcome);
        };
        assert_eq!(
            state.field_messages().and_then(|m| m.get("other")),
            Some("Database Error: Failed to Create Invoice.")
        );
        assert!(revalidator.paths().is_empty());
    }

    #[tokio::test]
    async fn update_changes_fields_but_keeps_id_and_date() {
        let (actions, store, revalidator) = memory_actions();
        actions.create_invoice(&InvoiceForm::new(CUSTOMER, "1", "pending")).await;
        let before = only_invoice(&store).await;

        let outcome = actions
            .update_invoice(&before.id, &InvoiceForm::new(OTHER_CUSTOMER, "99.99", "paid"))
            .await;

        assert_eq!(outcome.redirect_target(), Some(INVOICES_PATH));
        let after = only_invoice(&store).await;
        assert_eq!(after.id, before.id);
        assert_eq!(after.date, before.date);
        assert_eq!(after.customer_id, OTHER_CUSTOMER);
        assert_eq!(after.amount, 9999);
        assert_eq!(after.status, InvoiceStatus::Paid);
        assert_eq!(revalidator.paths(), vec![INVOICES_PATH, INVOICES_PATH]);
    }

    #[tokio::test]
    async fn update_validation_failure_is_reported_not_propagated() {
        let (actions, store, _) = memory_actions();
        actions.create_invoice(&InvoiceForm::new(CUSTOMER, "1", "pending")).await;
        let before = only_invoice(&store).await;

        let outcome = actions
            .update_invoice(&before.id, &InvoiceForm::new(CUSTOMER, "lots", "paid"))
            .await;

        let ActionOutcome::Invalid(state) = outcome else {
            panic!("expected invalid outcome, got {:?}", outcome);
        };
        assert_eq!(state.field_messages().and_then(|m| m.get("amount")), Some(REQUIRED_FIELD));
        assert_eq!(only_invoice(&store).await, before);
    }

    #[tokio::test]
    async fn update_store_failure_is_a_text_message() {
        let (actions, _) = broken_actions();
        let outcome = actions
            .update_invoice("d6e15727-9fe1-4961-8c5b-ea44a9bd81aa", &InvoiceForm::new(CUSTOMER, "1", "paid"))
            .await;
        assert_eq!(
            outcome,
            ActionOutcome::Failed(FormState::text("Database Error: Failed to Update Invoice."))
        );
    }

    #[tokio::test]
    async fn update_of_missing_id_is_a_no_op() {
        let (actions, store, _) = memory_actions();
        let outcome = actions
            .update_invoice(&uuid::Uuid::new_v4().to_string(), &InvoiceForm::new(CUSTOMER, "1", "paid"))
            .await;
        assert_eq!(outcome.redirect_target(), Some(INVOICES_PATH));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_row() {
        let (actions, store, revalidator) = memory_actions();
        actions.create_invoice(&InvoiceForm::new(CUSTOMER, "1", "pending")).await;
        actions.create_invoice(&InvoiceForm::new(CUSTOMER, "2", "paid")).await;
        let victim = store.list().await.unwrap().remove(0);

        let outcome = actions.delete_invoice(&victim.id).await;

        assert_eq!(outcome, ActionOutcome::Completed(FormState::text(DELETED_MESSAGE)));
        assert_eq!(outcome.redirect_target(), None);
        let remaining = store.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_ne!(remaining[0].id, victim.id);
        assert_eq!(revalidator.paths().len(), 3);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (actions, store, _) = memory_actions();
        actions.create_invoice(&InvoiceForm::new(CUSTOMER, "1", "pending")).await;
        let id = only_invoice(&store).await.id;

        let first = actions.delete_invoice(&id).await;
        let second = actions.delete_invoice(&id).await;

        assert_eq!(first, second);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_failures_are_reported() {
        let (actions, revalidator) = broken_actions();
        let outcome = actions.delete_invoice("d6e15727-9fe1-4961-8c5b-ea44a9bd81aa").await;
        assert_eq!(
            outcome,
            ActionOutcome::Failed(FormState::text("Database Error: Failed to Delete Invoice."))
        );
        assert!(revalidator.paths().is_empty());

        let (actions, _, _) = memory_actions();
        let outcome = actions.delete_invoice("not-a-uuid").await;
        assert_eq!(outcome.form_state().and_then(|s| s.text_message()), Some("Database Error: Failed to Delete Invoice."));
    }
}
