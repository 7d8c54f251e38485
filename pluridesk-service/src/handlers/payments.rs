//! Payment handlers.
//!
//! Recording a payment never mutates the invoice; the outstanding balance is
//! always derived at read time. Overpayment is accepted.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use pluridesk_core::error::AppError;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::CreatePaymentRequest,
    models::{CreatePayment, Payment},
    services::metrics::{PAYMENTS_TOTAL, PAYMENT_AMOUNT_TOTAL},
    AppState,
};

pub async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    payload.validate()?;

    let owner_id = state.config.owner_id;
    let invoice = state
        .db
        .get_invoice(owner_id, payload.invoice_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Invoice not found or access denied"))
        })?;

    let payment = state
        .db
        .create_payment(&CreatePayment {
            owner_id,
            invoice_id: invoice.invoice_id,
            amount: payload.amount,
            payment_date: payload
                .payment_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            method: payload.method.unwrap_or_else(|| "unspecified".to_string()),
            notes: payload.notes,
        })
        .await?;

    PAYMENTS_TOTAL.with_label_values(&[&payment.method]).inc();
    PAYMENT_AMOUNT_TOTAL
        .with_label_values(&[&invoice.currency])
        .inc_by(payment.amount.to_f64().unwrap_or(0.0));

    Ok((StatusCode::CREATED, Json(payment)))
}

#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    pub invoice_id: Uuid,
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let owner_id = state.config.owner_id;

    state
        .db
        .get_invoice(owner_id, query.invoice_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Invoice not found or access denied"))
        })?;

    let payments = state.db.list_payments(owner_id, query.invoice_id).await?;

    Ok(Json(payments))
}
