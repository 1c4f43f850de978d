// handlers/dashboard/mod.rs - GET /dashboard handler

pub mod invoices;

use axum::extract::State;
use serde_json::{json, Value};

use crate::auth::SessionUser;
use crate::database::{Invoice, InvoiceStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

/// Sum of cents for one status; `None` when it does not fit in an i64
fn total_for(invoices: &[Invoice], status: InvoiceStatus) -> Option<i64> {
    invoices
        .iter()
        .filter(|invoice| invoice.status == status)
        .try_fold(0i64, |total, invoice| total.checked_add(invoice.amount))
}

pub async fn overview(State(state): State<AppState>, session: SessionUser) -> ApiResult<Value> {
    let invoices = state.actions.store().list().await?;

    let (Some(paid), Some(pending)) = (
        total_for(&invoices, InvoiceStatus::Paid),
        total_for(&invoices, InvoiceStatus::Pending),
    ) else {
        tracing::error!("Invoice totals overflow 64-bit cents");
        return Err(ApiError::internal_server_error("Invoice totals are too large to display"));
    };

    Ok(ApiResponse::success(json!({
        "user": session.user,
        "invoiceCount": invoices.len(),
        "totalPaidInCents": paid,
        "totalPendingInCents": pending,
    })))
}
