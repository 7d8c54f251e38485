//! Job model for pluridesk-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How a job is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    PerWord,
    PerHour,
    FlatFee,
}

impl PricingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingType::PerWord => "per_word",
            PricingType::PerHour => "per_hour",
            PricingType::FlatFee => "flat_fee",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "per_word" => Some(PricingType::PerWord),
            "per_hour" => Some(PricingType::PerHour),
            "flat_fee" => Some(PricingType::FlatFee),
            _ => None,
        }
    }
}

/// Job status. Transitions are free-form except that `invoiced` is only
/// reachable through invoice generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Created,
    InProgress,
    Finished,
    Invoiced,
    Cancelled,
    OnHold,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::InProgress => "in_progress",
            JobStatus::Finished => "finished",
            JobStatus::Invoiced => "invoiced",
            JobStatus::Cancelled => "cancelled",
            JobStatus::OnHold => "on_hold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(JobStatus::Created),
            "in_progress" => Some(JobStatus::InProgress),
            "finished" => Some(JobStatus::Finished),
            "invoiced" => Some(JobStatus::Invoiced),
            "cancelled" => Some(JobStatus::Cancelled),
            "on_hold" => Some(JobStatus::OnHold),
            _ => None,
        }
    }
}

/// A unit of billable work for a client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub job_id: Uuid,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub job_code: String,
    pub title: String,
    pub currency: String,
    pub quantity: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub pricing_type: String,
    pub total_amount: Decimal,
    pub status: String,
    pub invoice_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a job. `total_amount` is computed by the caller from
/// the pricing type (see `domain::line_items::job_total`).
#[derive(Debug, Clone)]
pub struct CreateJob {
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub job_code: String,
    pub title: String,
    pub currency: String,
    pub quantity: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub pricing_type: PricingType,
    pub total_amount: Decimal,
    pub notes: Option<String>,
}

/// Input for updating a job.
#[derive(Debug, Clone, Default)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub status: Option<JobStatus>,
    pub notes: Option<String>,
}

/// Filter parameters for listing jobs.
#[derive(Debug, Clone, Default)]
pub struct ListJobsFilter {
    pub status: Option<JobStatus>,
    pub client_id: Option<Uuid>,
    pub page: i64,
    pub limit: i64,
}
