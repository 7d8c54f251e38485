//! Quote handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pluridesk_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        field_error, CreateQuoteRequest, ListQuery, ListResponse, QuoteDetailResponse,
        UpdateQuoteRequest,
    },
    models::{CreateQuoteItem, Job, ListQuotesFilter, Quote, QuoteStatus, UpdateQuote},
    AppState,
};

pub async fn create_quote(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<QuoteDetailResponse>), AppError> {
    payload.validate()?;

    let client = state
        .db
        .get_client(state.config.owner_id, payload.client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    let items: Vec<CreateQuoteItem> = payload
        .items
        .into_iter()
        .map(|item| CreateQuoteItem {
            description: item.description,
            quantity: item.quantity,
            rate: item.rate,
        })
        .collect();

    let currency = payload.currency.unwrap_or(client.default_currency);
    let (quote, items) = state
        .db
        .create_quote(
            state.config.owner_id,
            client.client_id,
            &currency,
            payload.notes.as_deref(),
            &items,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(QuoteDetailResponse { quote, items }),
    ))
}

pub async fn get_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> Result<Json<QuoteDetailResponse>, AppError> {
    let quote = state
        .db
        .get_quote(state.config.owner_id, quote_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quote not found")))?;

    let items = state.db.get_quote_items(quote.quote_id).await?;

    Ok(Json(QuoteDetailResponse { quote, items }))
}

pub async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Quote>>, AppError> {
    let (page, limit) = query.pagination();
    let status = parse_status_filter(query.status.as_deref())?;

    let (quotes, total) = state
        .db
        .list_quotes(
            state.config.owner_id,
            &ListQuotesFilter {
                status,
                page,
                limit,
            },
        )
        .await?;

    Ok(Json(ListResponse::new(quotes, page, limit, total)))
}

pub async fn update_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
    Json(payload): Json<UpdateQuoteRequest>,
) -> Result<Json<Quote>, AppError> {
    let status = parse_status_filter(payload.status.as_deref())?;

    let quote = state
        .db
        .update_quote(
            state.config.owner_id,
            quote_id,
            &UpdateQuote {
                status,
                notes: payload.notes,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quote not found")))?;

    Ok(Json(quote))
}

/// Turn a quote into a job, accepting the quote in the same transaction.
pub async fn convert_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = state
        .db
        .convert_quote(state.config.owner_id, quote_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quote not found")))?;

    Ok((StatusCode::CREATED, Json(job)))
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<QuoteStatus>, AppError> {
    match raw {
        None => Ok(None),
        Some(s) => QuoteStatus::parse(s).map(Some).ok_or_else(|| {
            AppError::ValidationError(field_error("status", "Unknown quote status"))
        }),
    }
}
