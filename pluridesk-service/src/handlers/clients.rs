//! Client handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pluridesk_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{CreateClientRequest, ListQuery, ListResponse},
    models::{Client, CreateClient},
    AppState,
};

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    payload.validate()?;

    let client = state
        .db
        .create_client(&CreateClient {
            owner_id: state.config.owner_id,
            name: payload.name,
            default_currency: payload.default_currency.unwrap_or_else(|| "USD".to_string()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    let client = state
        .db
        .get_client(state.config.owner_id, client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    Ok(Json(client))
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Client>>, AppError> {
    let (page, limit) = query.pagination();
    let (clients, total) = state
        .db
        .list_clients(state.config.owner_id, page, limit)
        .await?;

    Ok(Json(ListResponse::new(clients, page, limit, total)))
}
