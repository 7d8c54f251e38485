//! Supplier model for pluridesk-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A supplier that work can be outsourced to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub supplier_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub default_currency: String,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a supplier.
#[derive(Debug, Clone)]
pub struct CreateSupplier {
    pub owner_id: Uuid,
    pub name: String,
    pub default_currency: String,
}
