//! Expense model for pluridesk-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A business expense, fed into the per-currency expense report.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub expense_id: Uuid,
    pub owner_id: Uuid,
    pub description: String,
    pub category: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub expense_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
}

/// Input for recording an expense.
#[derive(Debug, Clone)]
pub struct CreateExpense {
    pub owner_id: Uuid,
    pub description: String,
    pub category: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub expense_date: NaiveDate,
}
