use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Fields a submitted invoice form can be rejected on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InvoiceField {
    Id,
    CustomerId,
    Amount,
    Status,
    Date,
}

impl InvoiceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceField::Id => "id",
            InvoiceField::CustomerId => "customerId",
            InvoiceField::Amount => "amount",
            InvoiceField::Status => "status",
            InvoiceField::Date => "date",
        }
    }
}

impl fmt::Display for InvoiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Field absent from the submission
    Required,
    /// Present but blank
    Empty,
    NotANumber,
    NotPositive,
    /// Numeric but too large to hold in minor units
    OutOfRange,
    InvalidEnum,
    InvalidDate,
}

impl IssueKind {
    pub fn describe(&self) -> &'static str {
        match self {
            IssueKind::Required => "is required",
            IssueKind::Empty => "must not be empty",
            IssueKind::NotANumber => "must be a number",
            IssueKind::NotPositive => "must be greater than zero",
            IssueKind::OutOfRange => "is too large",
            IssueKind::InvalidEnum => "must be one of: pending, paid",
            IssueKind::InvalidDate => "must be a YYYY-MM-DD date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: InvoiceField,
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.kind.describe())
    }
}

/// Structured rejection of a form, one issue per offending field
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("invalid invoice input: {}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = InvoiceField> + '_ {
        self.issues.iter().map(|issue| issue.field)
    }

    pub fn has_field(&self, field: InvoiceField) -> bool {
        self.fields().any(|f| f == field)
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ValidationIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
