//! Expense handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use pluridesk_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{CreateExpenseRequest, ListQuery, ListResponse},
    models::{CreateExpense, Expense},
    AppState,
};

pub async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    payload.validate()?;

    let expense = state
        .db
        .create_expense(&CreateExpense {
            owner_id: state.config.owner_id,
            description: payload.description,
            category: payload.category,
            amount: payload.amount,
            currency: payload.currency.unwrap_or_else(|| "USD".to_string()),
            expense_date: payload
                .expense_date
                .unwrap_or_else(|| Utc::now().date_naive()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Expense>>, AppError> {
    let (page, limit) = query.pagination();
    let (expenses, total) = state
        .db
        .list_expenses(state.config.owner_id, page, limit)
        .await?;

    Ok(Json(ListResponse::new(expenses, page, limit, total)))
}
