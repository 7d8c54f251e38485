//! Report handlers.
//!
//! Each section groups amounts by currency; nothing is ever converted or
//! summed across currencies.

use axum::{extract::State, Json};
use pluridesk_core::error::AppError;
use rust_decimal::Decimal;

use crate::{
    domain::{format_amount, sum_by_currency},
    dtos::{ReportSection, ReportsResponse},
    AppState,
};

fn section(rows: Vec<(Option<String>, Decimal)>) -> ReportSection {
    let totals = sum_by_currency(rows);
    let formatted = totals
        .iter()
        .map(|(currency, amount)| format_amount(*amount, currency))
        .collect();
    ReportSection { totals, formatted }
}

pub async fn reports(State(state): State<AppState>) -> Result<Json<ReportsResponse>, AppError> {
    let owner_id = state.config.owner_id;

    let revenue = state.db.revenue_rows(owner_id).await?;
    let supplier_costs = state.db.supplier_cost_rows(owner_id).await?;
    let expenses = state.db.expense_rows(owner_id).await?;
    let outstanding = state.db.outstanding_rows(owner_id).await?;
    let pending = state.db.pending_outsourcing_rows(owner_id).await?;

    Ok(Json(ReportsResponse {
        revenue: section(revenue),
        supplier_costs: section(supplier_costs),
        expenses: section(expenses),
        outstanding: section(outstanding),
        pending_outsourcing: section(pending),
    }))
}
