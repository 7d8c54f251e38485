//! Invoice generation batch validation.

mod common;

use common::TestApp;
use serde_json::{json, Value};

async fn expect_error(app: &TestApp, body: Value, status: u16, message: &str) {
    let resp = app.post("/invoices/generate", body).await;
    assert_eq!(resp.status(), status);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], message);
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Empty Batch Co", "USD").await;
    expect_error(
        &app,
        json!({ "client_id": client_id, "job_ids": [] }),
        400,
        "No jobs selected",
    )
    .await;
}

#[tokio::test]
async fn missing_client_id_is_rejected() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("No Client Co", "USD").await;
    let job_id = app.seed_flat_fee_job(client_id, "Job", 10.0).await;
    expect_error(
        &app,
        json!({ "job_ids": [job_id] }),
        400,
        "Client ID is required",
    )
    .await;
}

#[tokio::test]
async fn unknown_job_is_rejected() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Ghost Jobs Co", "USD").await;
    let job_id = app.seed_flat_fee_job(client_id, "Real job", 10.0).await;
    expect_error(
        &app,
        json!({
            "client_id": client_id,
            "job_ids": [job_id, "00000000-0000-0000-0000-000000000001"],
        }),
        400,
        "Some jobs could not be found or you don't have access to them",
    )
    .await;
}

#[tokio::test]
async fn repeated_job_ids_are_rejected() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Repeat Co", "USD").await;
    let job_id = app.seed_flat_fee_job(client_id, "Job", 10.0).await;
    expect_error(
        &app,
        json!({ "client_id": client_id, "job_ids": [job_id, job_id] }),
        400,
        "Some jobs could not be found or you don't have access to them",
    )
    .await;
}

#[tokio::test]
async fn mixed_clients_are_rejected() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_a = app.seed_client("Client A", "USD").await;
    let client_b = app.seed_client("Client B", "USD").await;
    let job_a = app.seed_flat_fee_job(client_a, "Job A", 10.0).await;
    let job_b = app.seed_flat_fee_job(client_b, "Job B", 10.0).await;
    expect_error(
        &app,
        json!({ "client_id": client_a, "job_ids": [job_a, job_b] }),
        400,
        "All jobs must belong to the same client",
    )
    .await;
}

#[tokio::test]
async fn mixed_currencies_are_rejected() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Multi Currency Co", "USD").await;
    let job_usd = app.seed_flat_fee_job(client_id, "USD job", 10.0).await;

    let resp = app
        .post(
            "/jobs",
            json!({
                "client_id": client_id,
                "title": "EUR job",
                "pricing_type": "flat_fee",
                "rate": 10,
                "currency": "EUR",
            }),
        )
        .await;
    let job: Value = resp.json().await.unwrap();
    let job_eur = job["job_id"].as_str().unwrap().to_string();

    expect_error(
        &app,
        json!({ "client_id": client_id, "job_ids": [job_usd, job_eur] }),
        400,
        "All jobs must have the same currency",
    )
    .await;
}

#[tokio::test]
async fn already_invoiced_jobs_are_rejected() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Double Billing Co", "USD").await;
    let job_id = app.seed_flat_fee_job(client_id, "Job", 25.0).await;

    let resp = app
        .post(
            "/invoices/generate",
            json!({ "client_id": client_id, "job_ids": [job_id] }),
        )
        .await;
    assert_eq!(resp.status(), 201);

    expect_error(
        &app,
        json!({ "client_id": client_id, "job_ids": [job_id] }),
        400,
        "Some jobs have already been invoiced",
    )
    .await;
}

/// One line item per job, described as "[job_code] title", due in 30 days.
#[tokio::test]
async fn generated_invoice_shape() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Shape Co", "USD").await;
    let job_a = app.seed_flat_fee_job(client_id, "First", 30.0).await;
    let job_b = app.seed_flat_fee_job(client_id, "Second", 70.0).await;

    let resp = app
        .post(
            "/invoices/generate",
            json!({ "client_id": client_id, "job_ids": [job_a, job_b] }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let invoice: Value = resp.json().await.unwrap();

    assert_eq!(invoice["subtotal"], json!("100.00"));
    assert_eq!(invoice["tax_amount"], json!("0.00"));
    assert_eq!(invoice["total"], json!("100.00"));
    assert!(invoice["due_date"].is_string());

    let items = invoice["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let first = items[0]["description"].as_str().unwrap();
    assert!(first.starts_with('[') && first.ends_with("First"));
    assert!(items[1]["description"].as_str().unwrap().ends_with("Second"));
}
