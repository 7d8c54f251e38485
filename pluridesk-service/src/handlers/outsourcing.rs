//! Outsourcing handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pluridesk_core::error::AppError;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::line_amount,
    dtos::{CreateOutsourcingRequest, ListQuery, ListResponse, UpdateOutsourcingRequest},
    models::{CreateOutsourcing, Outsourcing, UpdateOutsourcing},
    AppState,
};

pub async fn create_outsourcing(
    State(state): State<AppState>,
    Json(payload): Json<CreateOutsourcingRequest>,
) -> Result<(StatusCode, Json<Outsourcing>), AppError> {
    payload.validate()?;

    let owner_id = state.config.owner_id;
    let job = state
        .db
        .get_job(owner_id, payload.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Job not found")))?;
    let supplier = state
        .db
        .get_supplier(owner_id, payload.supplier_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Supplier not found")))?;

    let supplier_rate = payload.supplier_rate.unwrap_or(Decimal::ZERO);
    let supplier_total = payload
        .supplier_total
        .unwrap_or_else(|| line_amount(job.quantity.unwrap_or(Decimal::ONE), supplier_rate));

    let record = state
        .db
        .create_outsourcing(&CreateOutsourcing {
            owner_id,
            job_id: job.job_id,
            supplier_id: supplier.supplier_id,
            supplier_rate,
            supplier_currency: payload
                .supplier_currency
                .unwrap_or(supplier.default_currency),
            supplier_total,
            notes: payload.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_outsourcing(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Outsourcing>>, AppError> {
    let (page, limit) = query.pagination();
    let (records, total) = state
        .db
        .list_outsourcing(state.config.owner_id, query.paid, page, limit)
        .await?;

    Ok(Json(ListResponse::new(records, page, limit, total)))
}

pub async fn update_outsourcing(
    State(state): State<AppState>,
    Path(outsourcing_id): Path<Uuid>,
    Json(payload): Json<UpdateOutsourcingRequest>,
) -> Result<Json<Outsourcing>, AppError> {
    let record = state
        .db
        .update_outsourcing(
            state.config.owner_id,
            outsourcing_id,
            &UpdateOutsourcing {
                paid: payload.paid,
                notes: payload.notes,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Outsourcing record not found")))?;

    Ok(Json(record))
}

pub async fn delete_outsourcing(
    State(state): State<AppState>,
    Path(outsourcing_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .db
        .delete_outsourcing(state.config.owner_id, outsourcing_id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Outsourcing record not found"
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
