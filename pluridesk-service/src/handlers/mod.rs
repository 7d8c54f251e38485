//! HTTP handlers for pluridesk-service.

pub mod clients;
pub mod expenses;
pub mod invoices;
pub mod jobs;
pub mod outsourcing;
pub mod payments;
pub mod quotes;
pub mod reports;
pub mod suppliers;

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "pluridesk-service" })),
    )
}

/// Readiness includes a database round-trip.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not ready" })),
        ),
    }
}

pub async fn metrics() -> impl IntoResponse {
    crate::services::get_metrics()
}
