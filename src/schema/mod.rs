//! Invoice form validation.
//!
//! Raw submissions arrive as optional strings. A schema coerces them into a
//! typed [`InvoiceInput`] or reports every offending field at once, either as
//! a `Result` ([`InvoiceSchema::parse`]) or as a serializable discriminated
//! value ([`InvoiceSchema::safe_parse`]).

pub mod issue;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

use crate::database::models::invoice::InvoiceStatus;

pub use issue::{InvoiceField, IssueKind, ValidationError, ValidationIssue};

/// Raw invoice form as posted by the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    pub customer_id: Option<String>,
    pub amount: Option<String>,
    pub status: Option<String>,
}

impl InvoiceForm {
    pub fn new(customer_id: &str, amount: &str, status: &str) -> Self {
        Self {
            customer_id: Some(customer_id.to_string()),
            amount: Some(amount.to_string()),
            status: Some(status.to_string()),
        }
    }
}

/// Raw form of a complete invoice record, including the store-owned fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecordForm {
    pub id: Option<String>,
    pub customer_id: Option<String>,
    pub amount: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
}

/// Validated mutable invoice fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceInput {
    pub customer_id: String,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    #[serde(skip)]
    amount_in_cents: i64,
}

impl InvoiceInput {
    /// Amount in minor units, rounded to the nearest cent during validation
    pub fn amount_in_cents(&self) -> i64 {
        self.amount_in_cents
    }
}

/// Validated complete invoice record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: InvoiceInput,
    pub date: NaiveDate,
}

/// Non-throwing parse result, serialized as
/// `{"success": true, "data": ..}` or `{"success": false, "issues": [..]}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafeParse<T> {
    Success(T),
    Failure(ValidationError),
}

impl<T> SafeParse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SafeParse::Success(_))
    }

    pub fn into_result(self) -> Result<T, ValidationError> {
        match self {
            SafeParse::Success(data) => Ok(data),
            SafeParse::Failure(err) => Err(err),
        }
    }
}

impl<T> From<Result<T, ValidationError>> for SafeParse<T> {
    fn from(result: Result<T, ValidationError>) -> Self {
        match result {
            Ok(data) => SafeParse::Success(data),
            Err(err) => SafeParse::Failure(err),
        }
    }
}

impl<T: Serialize> Serialize for SafeParse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SafeParse", 2)?;
        match self {
            SafeParse::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            SafeParse::Failure(err) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("issues", &err.issues)?;
            }
        }
        state.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaKind {
    Create,
    Update,
}

/// A named rule set over the mutable invoice fields.
///
/// `CREATE` and `UPDATE` both omit `id` and `date` and currently apply the
/// same rules. They stay separate so one can tighten without the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceSchema {
    kind: SchemaKind,
}

impl InvoiceSchema {
    pub const CREATE: InvoiceSchema = InvoiceSchema { kind: SchemaKind::Create };
    pub const UPDATE: InvoiceSchema = InvoiceSchema { kind: SchemaKind::Update };

    pub fn name(&self) -> &'static str {
        match self.kind {
            SchemaKind::Create => "CreateInvoice",
            SchemaKind::Update => "UpdateInvoice",
        }
    }

    pub fn parse(&self, form: &InvoiceForm) -> Result<InvoiceInput, ValidationError> {
        let mut issues = Vec::new();
        let fields = parse_fields(form.customer_id.as_deref(), form.amount.as_deref(), form.status.as_deref(), &mut issues);

        match fields {
            Some(input) if issues.is_empty() => Ok(input),
            _ => Err(ValidationError { issues }),
        }
    }

    pub fn safe_parse(&self, form: &InvoiceForm) -> SafeParse<InvoiceInput> {
        self.parse(form).into()
    }
}

/// Validate a complete record: the mutable fields plus `id` and `date`
pub fn parse_record(form: &InvoiceRecordForm) -> Result<InvoiceRecord, ValidationError> {
    let mut issues = Vec::new();

    let id = required_text(InvoiceField::Id, form.id.as_deref(), &mut issues);
    let fields = parse_fields(form.customer_id.as_deref(), form.amount.as_deref(), form.status.as_deref(), &mut issues);
    let date = parse_date(form.date.as_deref(), &mut issues);

    match (id, fields, date) {
        (Some(id), Some(fields), Some(date)) if issues.is_empty() => Ok(InvoiceRecord { id, fields, date }),
        _ => Err(ValidationError { issues }),
    }
}

pub fn safe_parse_record(form: &InvoiceRecordForm) -> SafeParse<InvoiceRecord> {
    parse_record(form).into()
}

fn parse_fields(
    customer_id: Option<&str>,
    amount: Option<&str>,
    status: Option<&str>,
    issues: &mut Vec<ValidationIssue>,
) -> Option<InvoiceInput> {
    let customer_id = required_text(InvoiceField::CustomerId, customer_id, issues);
    let amount = parse_amount(amount, issues);
    let status = parse_status(status, issues);

    let (amount, amount_in_cents) = amount?;
    Some(InvoiceInput {
        customer_id: customer_id?,
        amount,
        status: status?,
        amount_in_cents,
    })
}

fn required_text(field: InvoiceField, raw: Option<&str>, issues: &mut Vec<ValidationIssue>) -> Option<String> {
    match raw {
        None => {
            issues.push(ValidationIssue { field, kind: IssueKind::Required });
            None
        }
        Some(value) if value.trim().is_empty() => {
            issues.push(ValidationIssue { field, kind: IssueKind::Empty });
            None
        }
        Some(value) => Some(value.trim().to_string()),
    }
}

/// Coerce an amount string into currency units and its cent value
fn parse_amount(raw: Option<&str>, issues: &mut Vec<ValidationIssue>) -> Option<(Decimal, i64)> {
    let field = InvoiceField::Amount;
    let text = match raw.map(str::trim) {
        None => {
            issues.push(ValidationIssue { field, kind: IssueKind::Required });
            return None;
        }
        Some("") => {
            issues.push(ValidationIssue { field, kind: IssueKind::Empty });
            return None;
        }
        Some(text) => text,
    };

    let amount = match Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)) {
        Ok(amount) => amount,
        Err(_) => {
            issues.push(ValidationIssue { field, kind: IssueKind::NotANumber });
            return None;
        }
    };

    if amount <= Decimal::ZERO {
        issues.push(ValidationIssue { field, kind: IssueKind::NotPositive });
        return None;
    }

    let cents = amount
        .checked_mul(Decimal::from(100))
        .map(|c| c.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|c| c.to_i64());

    match cents {
        Some(cents) => Some((amount, cents)),
        None => {
            issues.push(ValidationIssue { field, kind: IssueKind::OutOfRange });
            None
        }
    }
}

fn parse_status(raw: Option<&str>, issues: &mut Vec<ValidationIssue>) -> Option<InvoiceStatus> {
    let field = InvoiceField::Status;
    match raw {
        None => {
            issues.push(ValidationIssue { field, kind: IssueKind::Required });
            None
        }
        Some(value) => match value.parse::<InvoiceStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                issues.push(ValidationIssue { field, kind: IssueKind::InvalidEnum });
                None
            }
        },
    }
}

fn parse_date(raw: Option<&str>, issues: &mut Vec<ValidationIssue>) -> Option<NaiveDate> {
    let field = InvoiceField::Date;
    match raw {
        None => {
            issues.push(ValidationIssue { field, kind: IssueKind::Required });
            None
        }
        Some(value) => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                issues.push(ValidationIssue { field, kind: IssueKind::InvalidDate });
                None
            }
        },
    }
}
