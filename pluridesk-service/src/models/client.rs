//! Client model for pluridesk-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A client of the language-service provider.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub client_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub default_currency: String,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a client.
#[derive(Debug, Clone)]
pub struct CreateClient {
    pub owner_id: Uuid,
    pub name: String,
    pub default_currency: String,
}
