use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Invoice settlement state. No transitions are enforced; any invoice may
/// move between the two values through an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = ();

    /// Exact, case-sensitive literal match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            _ => Err(()),
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted invoice row. Ids are carried as text; the Postgres store
/// casts them from `uuid` on the way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    /// Minor units (cents)
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl Invoice {
    /// Amount in whole currency units, e.g. 1250 -> 12.5
    pub fn amount_in_units(&self) -> f64 {
        self.amount as f64 / 100.0
    }
}

/// Raw row shape returned by the Postgres store
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: String,
    pub date: NaiveDate,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = String;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<InvoiceStatus>()
            .map_err(|_| format!("invoice {} has unknown status '{}'", row.id, row.status))?;

        Ok(Invoice {
            id: row.id,
            customer_id: row.customer_id,
            amount: row.amount,
            status,
            date: row.date,
        })
    }
}

/// Values written by an INSERT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount_in_cents: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Values written by an UPDATE. `id` and `date` are never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount_in_cents: i64,
    pub status: InvoiceStatus,
}
