//! End-to-end quote → job → invoice → payment flow.

mod common;

use common::TestApp;
use serde_json::{json, Value};

/// Quote with items 10x5 and 2x25 totals 100; converting yields a job worth
/// 100; generating invoices it for 100; payments of 40 then 60 bring the
/// outstanding balance from 100 to 60 to 0.
#[tokio::test]
async fn quote_to_paid_invoice_flow() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Acme Translations", "USD").await;

    let resp = app
        .post(
            "/quotes",
            json!({
                "client_id": client_id,
                "items": [
                    { "description": "Translation", "quantity": 10, "rate": 5 },
                    { "description": "Review", "quantity": 2, "rate": 25 },
                ],
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let quote: Value = resp.json().await.unwrap();
    assert_eq!(quote["total"], json!("100.00"));
    assert_eq!(quote["status"], "draft");
    let quote_id = quote["quote_id"].as_str().unwrap().to_string();

    // Convert: quote becomes accepted, job carries the total.
    let resp = app.post(&format!("/quotes/{}/convert", quote_id), json!({})).await;
    assert_eq!(resp.status(), 201);
    let job: Value = resp.json().await.unwrap();
    assert_eq!(job["total_amount"], json!("100.00"));
    assert_eq!(job["status"], "created");
    let job_id = job["job_id"].as_str().unwrap().to_string();

    let resp = app.get(&format!("/quotes/{}", quote_id)).await;
    let quote: Value = resp.json().await.unwrap();
    assert_eq!(quote["status"], "accepted");

    // Generate an invoice from the job.
    let resp = app
        .post(
            "/invoices/generate",
            json!({ "client_id": client_id, "job_ids": [job_id] }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let invoice: Value = resp.json().await.unwrap();
    assert_eq!(invoice["total"], json!("100.00"));
    assert_eq!(invoice["status"], "draft");
    assert_eq!(invoice["items"].as_array().unwrap().len(), 1);
    let invoice_id = invoice["invoice_id"].as_str().unwrap().to_string();

    // The job is now invoiced and linked back.
    let resp = app.get(&format!("/jobs/{}", job_id)).await;
    let job: Value = resp.json().await.unwrap();
    assert_eq!(job["status"], "invoiced");
    assert_eq!(job["invoice_id"].as_str().unwrap(), invoice_id);

    // Record two payments; the outstanding balance is derived on read.
    let resp = app
        .post("/payments", json!({ "invoice_id": invoice_id, "amount": 40 }))
        .await;
    assert_eq!(resp.status(), 201);

    let resp = app.get(&format!("/invoices/{}", invoice_id)).await;
    let detail: Value = resp.json().await.unwrap();
    assert_eq!(detail["amount_paid"], json!("40.00"));
    assert_eq!(detail["outstanding"], json!("60.00"));

    let resp = app
        .post("/payments", json!({ "invoice_id": invoice_id, "amount": 60 }))
        .await;
    assert_eq!(resp.status(), 201);

    let resp = app.get(&format!("/invoices/{}", invoice_id)).await;
    let detail: Value = resp.json().await.unwrap();
    assert_eq!(detail["outstanding"], json!("0.00"));
    // Paying in full does not change the invoice status.
    assert_eq!(detail["status"], "draft");
}

/// Overpayment is accepted and shows as a negative outstanding balance.
#[tokio::test]
async fn overpayment_goes_negative() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Overpay Co", "EUR").await;
    let job_id = app.seed_flat_fee_job(client_id, "Small job", 50.0).await;

    let resp = app
        .post(
            "/invoices/generate",
            json!({ "client_id": client_id, "job_ids": [job_id] }),
        )
        .await;
    let invoice: Value = resp.json().await.unwrap();
    let invoice_id = invoice["invoice_id"].as_str().unwrap().to_string();

    let resp = app
        .post("/payments", json!({ "invoice_id": invoice_id, "amount": 80 }))
        .await;
    assert_eq!(resp.status(), 201);

    let resp = app.get(&format!("/invoices/{}", invoice_id)).await;
    let detail: Value = resp.json().await.unwrap();
    assert_eq!(detail["outstanding"], json!("-30.00"));
}

/// A rejected quote cannot be converted.
#[tokio::test]
async fn rejected_quote_cannot_convert() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let client_id = app.seed_client("Decliner Inc", "USD").await;
    let resp = app
        .post(
            "/quotes",
            json!({
                "client_id": client_id,
                "items": [{ "description": "Work", "quantity": 1, "rate": 10 }],
            }),
        )
        .await;
    let quote: Value = resp.json().await.unwrap();
    let quote_id = quote["quote_id"].as_str().unwrap().to_string();

    let resp = app
        .patch(&format!("/quotes/{}", quote_id), json!({ "status": "rejected" }))
        .await;
    assert_eq!(resp.status(), 200);

    let resp = app.post(&format!("/quotes/{}/convert", quote_id), json!({})).await;
    assert_eq!(resp.status(), 400);

    // Converting a missing quote is a 404.
    let resp = app
        .post(
            "/quotes/00000000-0000-0000-0000-000000000000/convert",
            json!({}),
        )
        .await;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Quote not found");
}

/// Recording a payment against a foreign or missing invoice is a 404 with
/// the access-denied wording.
#[tokio::test]
async fn payment_against_unknown_invoice_is_denied() {
    let Some(app) = TestApp::spawn().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let resp = app
        .post(
            "/payments",
            json!({
                "invoice_id": "00000000-0000-0000-0000-000000000000",
                "amount": 10,
            }),
        )
        .await;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invoice not found or access denied");
}
