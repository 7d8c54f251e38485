//! Invoice handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pluridesk_core::error::AppError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        field_error, CreateInvoiceRequest, GenerateInvoiceRequest, InvoiceDetailResponse,
        ListQuery, ListResponse, UpdateInvoiceRequest,
    },
    models::{CreateInvoiceItem, Invoice, InvoiceStatus, ListInvoicesFilter, UpdateInvoice},
    services::metrics::{INVOICES_TOTAL, INVOICE_AMOUNT_TOTAL},
    AppState,
};

fn record_invoice_metrics(invoice: &Invoice, origin: &str) {
    INVOICES_TOTAL.with_label_values(&[origin]).inc();
    INVOICE_AMOUNT_TOTAL
        .with_label_values(&[&invoice.currency])
        .inc_by(invoice.total.to_f64().unwrap_or(0.0));
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceDetailResponse>), AppError> {
    payload.validate()?;

    let client = state
        .db
        .get_client(state.config.owner_id, payload.client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    let items: Vec<CreateInvoiceItem> = payload
        .items
        .into_iter()
        .map(|item| CreateInvoiceItem {
            description: item.description,
            quantity: item.quantity,
            rate: item.rate,
        })
        .collect();

    let currency = payload.currency.unwrap_or_else(|| client.default_currency.clone());
    let (invoice, items) = state
        .db
        .create_invoice(
            state.config.owner_id,
            client.client_id,
            &currency,
            payload.tax_amount.unwrap_or(Decimal::ZERO),
            payload.due_date,
            payload.notes.as_deref(),
            &items,
        )
        .await?;

    record_invoice_metrics(&invoice, "direct");

    let outstanding = invoice.total;
    Ok((
        StatusCode::CREATED,
        Json(InvoiceDetailResponse {
            invoice,
            client_name: client.name,
            items,
            payments: vec![],
            amount_paid: Decimal::ZERO,
            outstanding,
        }),
    ))
}

/// Batch-generate one invoice from finished jobs of a single client.
pub async fn generate_invoice(
    State(state): State<AppState>,
    Json(payload): Json<GenerateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceDetailResponse>), AppError> {
    if payload.job_ids.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("No jobs selected")));
    }
    let client_id = payload
        .client_id
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Client ID is required")))?;

    let client = state
        .db
        .get_client(state.config.owner_id, client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    let (invoice, items) = state
        .db
        .generate_invoice(state.config.owner_id, client_id, &payload.job_ids)
        .await?;

    record_invoice_metrics(&invoice, "generated");

    let outstanding = invoice.total;
    Ok((
        StatusCode::CREATED,
        Json(InvoiceDetailResponse {
            invoice,
            client_name: client.name,
            items,
            payments: vec![],
            amount_paid: Decimal::ZERO,
            outstanding,
        }),
    ))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<InvoiceDetailResponse>, AppError> {
    let owner_id = state.config.owner_id;
    let invoice = state
        .db
        .get_invoice(owner_id, invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    let client = state
        .db
        .get_client(owner_id, invoice.client_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Invoice references a missing client"))
        })?;
    let items = state.db.get_invoice_items(invoice.invoice_id).await?;
    let payments = state.db.list_payments(owner_id, invoice.invoice_id).await?;

    let amount_paid: Decimal = payments.iter().map(|p| p.amount).sum();
    // Not clamped: a negative balance means overpayment.
    let outstanding = invoice.total - amount_paid;

    Ok(Json(InvoiceDetailResponse {
        invoice,
        client_name: client.name,
        items,
        payments,
        amount_paid,
        outstanding,
    }))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Invoice>>, AppError> {
    let (page, limit) = query.pagination();
    let status = parse_status_filter(query.status.as_deref())?;

    let (invoices, total) = state
        .db
        .list_invoices(
            state.config.owner_id,
            &ListInvoicesFilter {
                status,
                client_id: query.client_id,
                page,
                limit,
            },
        )
        .await?;

    Ok(Json(ListResponse::new(invoices, page, limit, total)))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> Result<Json<Invoice>, AppError> {
    let status = parse_status_filter(payload.status.as_deref())?;

    let invoice = state
        .db
        .update_invoice(
            state.config.owner_id,
            invoice_id,
            &UpdateInvoice {
                status,
                due_date: payload.due_date,
                notes: payload.notes,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(invoice))
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<InvoiceStatus>, AppError> {
    match raw {
        None => Ok(None),
        Some(s) => InvoiceStatus::parse(s).map(Some).ok_or_else(|| {
            AppError::ValidationError(field_error("status", "Unknown invoice status"))
        }),
    }
}
