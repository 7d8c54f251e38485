//! Invoice model for pluridesk-service.

use super::IllegalTransition;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(InvoiceStatus::Draft),
            "sent" => Some(InvoiceStatus::Sent),
            "paid" => Some(InvoiceStatus::Paid),
            "overdue" => Some(InvoiceStatus::Overdue),
            _ => None,
        }
    }

    /// Advance the lifecycle. `paid` is never set automatically by payment
    /// recording; it must come through here.
    pub fn transition_to(self, target: InvoiceStatus) -> Result<InvoiceStatus, IllegalTransition> {
        use InvoiceStatus::*;
        match (self, target) {
            (Draft, Sent) => Ok(target),
            (Sent, Paid) | (Sent, Overdue) => Ok(target),
            (Overdue, Paid) => Ok(target),
            (from, to) => Err(IllegalTransition {
                kind: "invoice",
                from: from.as_str(),
                to: to.as_str(),
            }),
        }
    }
}

/// Invoice document. `total` is always `subtotal + tax_amount`; every write
/// path recomputes the three from the items rather than trusting the caller.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub invoice_number: String,
    pub currency: String,
    pub status: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Line item on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    pub invoice_item_id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    pub sort_order: i32,
}

/// Input for one line item on a new invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceItem {
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
}

/// Input for updating an invoice.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoice {
    pub status: Option<InvoiceStatus>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Filter parameters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct ListInvoicesFilter {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<Uuid>,
    pub page: i64,
    pub limit: i64,
}
