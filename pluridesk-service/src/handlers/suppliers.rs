//! Supplier handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pluridesk_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{CreateSupplierRequest, ListQuery, ListResponse},
    models::{CreateSupplier, Supplier},
    AppState,
};

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    payload.validate()?;

    let supplier = state
        .db
        .create_supplier(&CreateSupplier {
            owner_id: state.config.owner_id,
            name: payload.name,
            default_currency: payload.default_currency.unwrap_or_else(|| "USD".to_string()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    let supplier = state
        .db
        .get_supplier(state.config.owner_id, supplier_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Supplier not found")))?;

    Ok(Json(supplier))
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Supplier>>, AppError> {
    let (page, limit) = query.pagination();
    let (suppliers, total) = state
        .db
        .list_suppliers(state.config.owner_id, page, limit)
        .await?;

    Ok(Json(ListResponse::new(suppliers, page, limit, total)))
}
