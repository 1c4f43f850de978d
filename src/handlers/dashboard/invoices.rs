// handlers/dashboard/invoices.rs - /dashboard/invoices[/:id] handlers
//
// Reads answer with the success envelope; mutations answer with the
// ActionOutcome produced by InvoiceActions.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    Form,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::actions::{ActionOutcome, INVOICES_PATH};
use crate::database::Invoice;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schema::InvoiceForm;
use crate::server::AppState;

fn invoice_view(invoice: &Invoice) -> Value {
    json!({
        "id": invoice.id,
        "customerId": invoice.customer_id,
        "amount": invoice.amount,
        "amountInUnits": invoice.amount_in_units(),
        "status": invoice.status,
        "date": invoice.date,
    })
}

/// A body that is not a urlencoded form is validated as an empty form, so
/// the caller still gets the per-field messages
fn form_or_empty(form: Result<Form<InvoiceForm>, FormRejection>) -> InvoiceForm {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!("Unreadable invoice form: {}", rejection);
            InvoiceForm::default()
        }
    }
}

/// GET /dashboard/invoices
///
/// Served from the view cache until a mutation revalidates the path. A
/// listing read from the store is only cached if no mutation landed while
/// it was being read.
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    if let Some(view) = state.views.get(INVOICES_PATH).await {
        return Ok(ApiResponse::success(view));
    }

    let generation = state.views.generation().await;
    let invoices = state.actions.store().list().await?;
    let view = Value::Array(invoices.iter().map(invoice_view).collect());
    if !state.views.put_if_current(INVOICES_PATH, view.clone(), generation).await {
        debug!("Listing changed while rendering; not caching {}", INVOICES_PATH);
    }

    Ok(ApiResponse::success(view))
}

/// GET /dashboard/invoices/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    match state.actions.store().find(&id).await? {
        Some(invoice) => Ok(ApiResponse::success(invoice_view(&invoice))),
        None => Err(ApiError::not_found(format!("Invoice '{}' not found", id))),
    }
}

/// POST /dashboard/invoices
pub async fn create(
    State(state): State<AppState>,
    form: Result<Form<InvoiceForm>, FormRejection>,
) -> ActionOutcome {
    state.actions.create_invoice(&form_or_empty(form)).await
}

/// POST|PUT /dashboard/invoices/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<InvoiceForm>, FormRejection>,
) -> ActionOutcome {
    state.actions.update_invoice(&id, &form_or_empty(form)).await
}

/// DELETE /dashboard/invoices/:id and POST /dashboard/invoices/:id/delete
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ActionOutcome {
    state.actions.delete_invoice(&id).await
}
