//! Outsourcing model for pluridesk-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A hand-off of a job to a supplier, with its own payable tracking.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Outsourcing {
    pub outsourcing_id: Uuid,
    pub owner_id: Uuid,
    pub job_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_rate: Decimal,
    pub supplier_currency: String,
    pub supplier_total: Decimal,
    pub paid: bool,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating an outsourcing record.
#[derive(Debug, Clone)]
pub struct CreateOutsourcing {
    pub owner_id: Uuid,
    pub job_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_rate: Decimal,
    pub supplier_currency: String,
    pub supplier_total: Decimal,
    pub notes: Option<String>,
}

/// Input for updating an outsourcing record.
#[derive(Debug, Clone, Default)]
pub struct UpdateOutsourcing {
    pub paid: Option<bool>,
    pub notes: Option<String>,
}
