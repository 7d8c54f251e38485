//! Request and response DTOs.
//!
//! Validation lives here, on the request types, so every handler runs the
//! same checks. Monetary fields deserialize into `Decimal`; totals are never
//! accepted from the client.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Default and maximum page sizes for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some(Cow::Borrowed("Amount must not be negative"));
        return Err(err);
    }
    Ok(())
}

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some(Cow::Borrowed("Amount must be greater than zero"));
        return Err(err);
    }
    Ok(())
}

/// Build a single-field validation failure, for checks that cannot be
/// expressed as derive attributes (status strings, pricing types).
pub fn field_error(field: &'static str, message: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let mut err = ValidationError::new("invalid");
    err.message = Some(Cow::Owned(message.to_string()));
    errors.add(field, err);
    errors
}

// -----------------------------------------------------------------------------
// Pagination
// -----------------------------------------------------------------------------

/// Common query parameters for list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
    pub paid: Option<bool>,
}

impl ListQuery {
    /// Resolve page and limit to their clamped effective values.
    pub fn pagination(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        (page, limit)
    }
}

#[derive(Debug, Serialize)]
pub struct ListMetadata {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

/// Paginated list envelope.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub metadata: ListMetadata,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            data,
            metadata: ListMetadata {
                page,
                limit,
                total,
                total_pages,
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Clients and suppliers
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub default_currency: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub default_currency: Option<String>,
}

// -----------------------------------------------------------------------------
// Jobs
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub currency: Option<String>,
    #[validate(custom(function = non_negative))]
    pub quantity: Option<Decimal>,
    #[validate(custom(function = non_negative))]
    pub rate: Option<Decimal>,
    pub pricing_type: String,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

// -----------------------------------------------------------------------------
// Quotes
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct LineItemRequest {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(custom(function = positive))]
    pub quantity: Decimal,
    #[validate(custom(function = positive))]
    pub rate: Decimal,
}

/// A quote may start with no items; its total is then zero.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    pub client_id: Uuid,
    pub currency: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuoteRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

// -----------------------------------------------------------------------------
// Invoices
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub client_id: Uuid,
    pub currency: Option<String>,
    #[validate(custom(function = non_negative))]
    pub tax_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    #[validate(nested)]
    pub items: Vec<LineItemRequest>,
}

/// Request to generate one invoice from a batch of jobs.
#[derive(Debug, Deserialize)]
pub struct GenerateInvoiceRequest {
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub job_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub status: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Invoice detail response: the document, its items, payments to date, and
/// the derived outstanding balance (never clamped at zero).
#[derive(Debug, Serialize)]
pub struct InvoiceDetailResponse {
    #[serde(flatten)]
    pub invoice: crate::models::Invoice,
    pub client_name: String,
    pub items: Vec<crate::models::InvoiceItem>,
    pub payments: Vec<crate::models::Payment>,
    pub amount_paid: Decimal,
    pub outstanding: Decimal,
}

/// Quote detail response.
#[derive(Debug, Serialize)]
pub struct QuoteDetailResponse {
    #[serde(flatten)]
    pub quote: crate::models::Quote,
    pub items: Vec<crate::models::QuoteItem>,
}

// -----------------------------------------------------------------------------
// Payments
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub invoice_id: Uuid,
    #[validate(custom(function = positive))]
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub method: Option<String>,
    pub notes: Option<String>,
}

// -----------------------------------------------------------------------------
// Expenses
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub category: Option<String>,
    #[validate(custom(function = non_negative))]
    pub amount: Decimal,
    pub currency: Option<String>,
    pub expense_date: Option<NaiveDate>,
}

// -----------------------------------------------------------------------------
// Outsourcing
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOutsourcingRequest {
    pub job_id: Uuid,
    pub supplier_id: Uuid,
    #[validate(custom(function = non_negative))]
    pub supplier_rate: Option<Decimal>,
    pub supplier_currency: Option<String>,
    #[validate(custom(function = non_negative))]
    pub supplier_total: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOutsourcingRequest {
    pub paid: Option<bool>,
    pub notes: Option<String>,
}

// -----------------------------------------------------------------------------
// Reports
// -----------------------------------------------------------------------------

/// One report section: per-currency totals plus display strings.
#[derive(Debug, Serialize)]
pub struct ReportSection {
    pub totals: std::collections::BTreeMap<String, Decimal>,
    pub formatted: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    pub revenue: ReportSection,
    pub supplier_costs: ReportSection,
    pub expenses: ReportSection,
    pub outstanding: ReportSection,
    pub pending_outsourcing: ReportSection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pagination_defaults_and_clamps() {
        let q = ListQuery::default();
        assert_eq!(q.pagination(), (1, 20));

        let q = ListQuery {
            page: Some(0),
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(q.pagination(), (1, 100));

        let q = ListQuery {
            page: Some(3),
            limit: Some(-5),
            ..Default::default()
        };
        assert_eq!(q.pagination(), (3, 1));
    }

    #[test]
    fn total_pages_rounds_up() {
        let resp = ListResponse::new(vec![1, 2, 3], 1, 20, 41);
        assert_eq!(resp.metadata.total_pages, 3);

        let empty: ListResponse<i32> = ListResponse::new(vec![], 1, 20, 0);
        assert_eq!(empty.metadata.total_pages, 0);
    }

    #[test]
    fn negative_amounts_fail_validation() {
        let req = CreatePaymentRequest {
            invoice_id: Uuid::new_v4(),
            amount: dec!(-5),
            payment_date: None,
            method: None,
            notes: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_payment_fails_validation() {
        let req = CreatePaymentRequest {
            invoice_id: Uuid::new_v4(),
            amount: Decimal::ZERO,
            payment_date: None,
            method: None,
            notes: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn quote_may_start_empty() {
        let req = CreateQuoteRequest {
            client_id: Uuid::new_v4(),
            currency: None,
            notes: None,
            items: vec![],
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn nested_item_validation_runs() {
        let req = CreateQuoteRequest {
            client_id: Uuid::new_v4(),
            currency: None,
            notes: None,
            items: vec![LineItemRequest {
                description: String::new(),
                quantity: dec!(1),
                rate: dec!(1),
            }],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_quantity_line_item_is_rejected() {
        let req = CreateQuoteRequest {
            client_id: Uuid::new_v4(),
            currency: None,
            notes: None,
            items: vec![LineItemRequest {
                description: "Translation".to_string(),
                quantity: Decimal::ZERO,
                rate: dec!(5),
            }],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_rate_line_item_is_rejected() {
        let req = CreateQuoteRequest {
            client_id: Uuid::new_v4(),
            currency: None,
            notes: None,
            items: vec![LineItemRequest {
                description: "Translation".to_string(),
                quantity: dec!(10),
                rate: Decimal::ZERO,
            }],
        };
        assert!(req.validate().is_err());
    }
}
