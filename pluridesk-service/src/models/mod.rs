//! Domain models for pluridesk-service.

mod client;
mod expense;
mod invoice;
mod job;
mod outsourcing;
mod payment;
mod quote;
mod supplier;

pub use client::{Client, CreateClient};
pub use expense::{CreateExpense, Expense};
pub use invoice::{
    CreateInvoiceItem, Invoice, InvoiceItem, InvoiceStatus, ListInvoicesFilter, UpdateInvoice,
};
pub use job::{CreateJob, Job, JobStatus, ListJobsFilter, PricingType, UpdateJob};
pub use outsourcing::{CreateOutsourcing, Outsourcing, UpdateOutsourcing};
pub use payment::{CreatePayment, Payment};
pub use quote::{CreateQuoteItem, ListQuotesFilter, Quote, QuoteItem, QuoteStatus, UpdateQuote};
pub use supplier::{CreateSupplier, Supplier};

use thiserror::Error;

/// A document status change that the lifecycle rules do not allow.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Illegal {kind} status transition: {from} -> {to}")]
pub struct IllegalTransition {
    pub kind: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}
