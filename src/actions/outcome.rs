use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::schema::ValidationError;

/// Message shown beside every rejected form field
pub const REQUIRED_FIELD: &str = "required field";

/// Field name -> inline message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMessages(BTreeMap<String, String>);

impl FieldMessages {
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Form-level message not tied to any input
    pub fn other(message: impl Into<String>) -> Self {
        let mut messages = Self::default();
        messages.insert("other", message);
        messages
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&ValidationError> for FieldMessages {
    fn from(err: &ValidationError) -> Self {
        let mut messages = Self::default();
        for field in err.fields() {
            messages.insert(field.as_str(), REQUIRED_FIELD);
        }
        messages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionMessage {
    Text(String),
    Fields(FieldMessages),
}

/// Payload returned to the form when an action does not redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub message: ActionMessage,
}

impl FormState {
    pub fn text(message: impl Into<String>) -> Self {
        Self { message: ActionMessage::Text(message.into()) }
    }

    pub fn fields(messages: FieldMessages) -> Self {
        Self { message: ActionMessage::Fields(messages) }
    }

    pub fn field_messages(&self) -> Option<&FieldMessages> {
        match &self.message {
            ActionMessage::Fields(messages) => Some(messages),
            ActionMessage::Text(_) => None,
        }
    }

    pub fn text_message(&self) -> Option<&str> {
        match &self.message {
            ActionMessage::Text(text) => Some(text),
            ActionMessage::Fields(_) => None,
        }
    }
}

/// Result of every invoice mutation. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Mutation applied; send the client to this path
    Redirect(String),
    /// Mutation applied; no navigation
    Completed(FormState),
    /// Input rejected by the schema
    Invalid(FormState),
    /// Store rejected the statement
    Failed(FormState),
}

impl ActionOutcome {
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            ActionOutcome::Redirect(path) => Some(path),
            _ => None,
        }
    }

    pub fn form_state(&self) -> Option<&FormState> {
        match self {
            ActionOutcome::Redirect(_) => None,
            ActionOutcome::Completed(state) | ActionOutcome::Invalid(state) | ActionOutcome::Failed(state) => Some(state),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionOutcome::Redirect(_) => StatusCode::SEE_OTHER,
            ActionOutcome::Completed(_) => StatusCode::OK,
            ActionOutcome::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ActionOutcome::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ActionOutcome::Redirect(path) => Redirect::to(&path).into_response(),
            ActionOutcome::Completed(state) | ActionOutcome::Invalid(state) | ActionOutcome::Failed(state) => {
                (status, Json(state)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{InvoiceField, IssueKind, ValidationIssue};
    use serde_json::json;

    #[test]
    fn validation_errors_become_required_field_messages() {
        let err = ValidationError {
            issues: vec![
                ValidationIssue { field: InvoiceField::CustomerId, kind: IssueKind::Empty },
                ValidationIssue { field: InvoiceField::Amount, kind: IssueKind::NotANumber },
            ],
        };
        let state = FormState::fields(FieldMessages::from(&err));
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({ "message": { "amount": "required field", "customerId": "required field" } })
        );
    }

    #[test]
    fn text_and_other_shapes() {
        assert_eq!(
            serde_json::to_value(FormState::text("Deleted Invoice.")).unwrap(),
            json!({ "message": "Deleted Invoice." })
        );
        assert_eq!(
            serde_json::to_value(FormState::fields(FieldMessages::other("boom"))).unwrap(),
            json!({ "message": { "other": "boom" } })
        );
    }

    #[test]
    fn outcome_status_codes() {
        let redirect = ActionOutcome::Redirect("/dashboard/invoices".to_string());
        assert_eq!(redirect.into_response().status(), StatusCode::SEE_OTHER);
        assert_eq!(ActionOutcome::Invalid(FormState::text("x")).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ActionOutcome::Failed(FormState::text("x")).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ActionOutcome::Completed(FormState::text("x")).status_code(), StatusCode::OK);
    }
}
