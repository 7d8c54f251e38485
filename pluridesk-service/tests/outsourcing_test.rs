//! Outsourcing records and supplier payables.

mod common;

use common::TestApp;
use serde_json::{json, Value};

async fn seed_supplier(app: &TestApp, name: &str, currency: &str) -> String {
    let resp = app
        .post("/suppliers", json!({ "name": name, "default_currency": currency }))
        .await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    body["supplier_id"].as_str().unwrap().to_string()
}

/// supplier_total defaults to rate x job quantity when not given.
#[tokio::test]
async fn supplier_total_is_derived_from_job_quantity() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Outsource Co", "USD").await;
    let supplier_id = seed_supplier(&app, "Freelancer", "EUR").await;

    let resp = app
        .post(
            "/jobs",
            json!({
                "client_id": client_id,
                "title": "Big translation",
                "pricing_type": "per_word",
                "quantity": 1000,
                "rate": 0.10,
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let job: Value = resp.json().await.unwrap();
    let job_id = job["job_id"].as_str().unwrap().to_string();

    let resp = app
        .post(
            "/outsourcing",
            json!({
                "job_id": job_id,
                "supplier_id": supplier_id,
                "supplier_rate": 0.05,
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let record: Value = resp.json().await.unwrap();
    assert_eq!(record["supplier_total"], json!("50.00"));
    assert_eq!(record["supplier_currency"], "EUR");
    assert_eq!(record["paid"], false);
}

#[tokio::test]
async fn paid_filter_and_pending_report() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Pending Co", "USD").await;
    let supplier_id = seed_supplier(&app, "Vendor", "USD").await;
    let job_id = app.seed_flat_fee_job(client_id, "Job", 100.0).await;

    let resp = app
        .post(
            "/outsourcing",
            json!({
                "job_id": job_id,
                "supplier_id": supplier_id,
                "supplier_total": 60,
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let record: Value = resp.json().await.unwrap();
    let outsourcing_id = record["outsourcing_id"].as_str().unwrap().to_string();

    let resp = app.get("/reports").await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["pending_outsourcing"]["totals"]["USD"], json!("60.00"));
    assert_eq!(body["supplier_costs"]["totals"]["USD"], json!("60.00"));

    let resp = app
        .patch(
            &format!("/outsourcing/{}", outsourcing_id),
            json!({ "paid": true }),
        )
        .await;
    assert_eq!(resp.status(), 200);

    // Paid records leave the pending payout but stay in supplier costs.
    let resp = app.get("/reports").await;
    let body: Value = resp.json().await.unwrap();
    assert!(body["pending_outsourcing"]["totals"].get("USD").is_none());
    assert_eq!(body["supplier_costs"]["totals"]["USD"], json!("60.00"));

    let resp = app.get("/outsourcing?paid=false").await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    let resp = app.get("/outsourcing?paid=true").await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = app
        .client
        .delete(format!("{}/outsourcing/{}", app.address, outsourcing_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = app.get("/outsourcing").await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["metadata"]["total"], 0);
}
