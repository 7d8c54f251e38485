//! Job handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pluridesk_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::job_total,
    dtos::{field_error, CreateJobRequest, ListQuery, ListResponse, UpdateJobRequest},
    models::{CreateJob, Job, JobStatus, ListJobsFilter, PricingType, UpdateJob},
    services::database::generate_job_code,
    AppState,
};

pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    payload.validate()?;

    let pricing_type = PricingType::parse(&payload.pricing_type).ok_or_else(|| {
        AppError::ValidationError(field_error(
            "pricing_type",
            "pricing_type must be one of per_word, per_hour, flat_fee",
        ))
    })?;

    let client = state
        .db
        .get_client(state.config.owner_id, payload.client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    let total_amount = job_total(pricing_type, payload.quantity, payload.rate);

    let job = state
        .db
        .create_job(&CreateJob {
            owner_id: state.config.owner_id,
            client_id: client.client_id,
            job_code: generate_job_code(),
            title: payload.title,
            currency: payload.currency.unwrap_or(client.default_currency),
            quantity: payload.quantity,
            rate: payload.rate,
            pricing_type,
            total_amount,
            notes: payload.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    let job = state
        .db
        .get_job(state.config.owner_id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Job not found")))?;

    Ok(Json(job))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Job>>, AppError> {
    let (page, limit) = query.pagination();
    let status = parse_status_filter(query.status.as_deref())?;

    let (jobs, total) = state
        .db
        .list_jobs(
            state.config.owner_id,
            &ListJobsFilter {
                status,
                client_id: query.client_id,
                page,
                limit,
            },
        )
        .await?;

    Ok(Json(ListResponse::new(jobs, page, limit, total)))
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<Json<Job>, AppError> {
    let status = parse_status_filter(payload.status.as_deref())?;

    let job = state
        .db
        .update_job(
            state.config.owner_id,
            job_id,
            &UpdateJob {
                title: payload.title,
                status,
                notes: payload.notes,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Job not found")))?;

    Ok(Json(job))
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<JobStatus>, AppError> {
    match raw {
        None => Ok(None),
        Some(s) => JobStatus::parse(s).map(Some).ok_or_else(|| {
            AppError::ValidationError(field_error("status", "Unknown job status"))
        }),
    }
}
