//! Database service for pluridesk-service.
//!
//! Every row is scoped to the single configured owner. Multi-step business
//! operations (quote creation with items, quote conversion, invoice
//! generation) run inside one Postgres transaction so partial failure never
//! leaves intermediate state behind.

use crate::domain::{invoice_total, line_amount, subtotal};
use crate::models::{
    CreateClient, CreateExpense, CreateInvoiceItem, CreateJob, CreateOutsourcing, CreatePayment,
    CreateQuoteItem, CreateSupplier, Client, Expense, Invoice, InvoiceItem, InvoiceStatus, Job,
    JobStatus, ListInvoicesFilter, ListJobsFilter, ListQuotesFilter, Outsourcing, Payment,
    PricingType, Quote, QuoteItem, QuoteStatus, Supplier, UpdateInvoice, UpdateJob,
    UpdateOutsourcing, UpdateQuote,
};
use crate::services::metrics::DB_QUERY_DURATION;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use pluridesk_core::error::AppError;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Uuid;
use tracing::{info, instrument};

const QUOTE_COLUMNS: &str =
    "quote_id, owner_id, client_id, quote_number, currency, status, total, notes, created_utc";
const QUOTE_ITEM_COLUMNS: &str =
    "quote_item_id, quote_id, description, quantity, rate, amount, sort_order";
const INVOICE_COLUMNS: &str = "invoice_id, owner_id, client_id, invoice_number, currency, status, \
     subtotal, tax_amount, total, issue_date, due_date, notes, created_utc";
const INVOICE_ITEM_COLUMNS: &str =
    "invoice_item_id, invoice_id, description, quantity, rate, amount, sort_order";
const JOB_COLUMNS: &str = "job_id, owner_id, client_id, job_code, title, currency, quantity, \
     rate, pricing_type, total_amount, status, invoice_id, notes, created_utc";
const PAYMENT_COLUMNS: &str =
    "payment_id, owner_id, invoice_id, amount, payment_date, method, notes, created_utc";

/// Job code: current year plus a random 4-digit suffix. Human-friendly, not
/// guaranteed unique.
pub(crate) fn generate_job_code() -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{}-{:04}", Utc::now().year(), suffix)
}

fn clamp_page(page: i64, limit: i64) -> (i64, i64, i64) {
    let page = page.max(1);
    let limit = limit.clamp(1, 100);
    (page, limit, (page - 1) * limit)
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "pluridesk-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .idle_timeout(std::time::Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Client Operations
    // -------------------------------------------------------------------------

    /// Create a new client.
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id))]
    pub async fn create_client(&self, input: &CreateClient) -> Result<Client, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (client_id, owner_id, name, default_currency)
            VALUES ($1, $2, $3, $4)
            RETURNING client_id, owner_id, name, default_currency, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(&input.name)
        .bind(&input.default_currency)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create client: {}", e)))?;

        timer.observe_duration();

        info!(client_id = %client.client_id, "Client created");

        Ok(client)
    }

    /// Get a client by ID.
    #[instrument(skip(self), fields(owner_id = %owner_id, client_id = %client_id))]
    pub async fn get_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT client_id, owner_id, name, default_currency, created_utc
            FROM clients
            WHERE owner_id = $1 AND client_id = $2
            "#,
        )
        .bind(owner_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get client: {}", e)))?;

        timer.observe_duration();

        Ok(client)
    }

    /// List clients, paginated, with the total row count.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list_clients(
        &self,
        owner_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Client>, i64), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_clients"])
            .start_timer();

        let (_, limit, offset) = clamp_page(page, limit);

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT client_id, owner_id, name, default_currency, created_utc
            FROM clients
            WHERE owner_id = $1
            ORDER BY name, client_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list clients: {}", e)))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count clients: {}", e))
            })?;

        timer.observe_duration();

        Ok((clients, total))
    }

    // -------------------------------------------------------------------------
    // Supplier Operations
    // -------------------------------------------------------------------------

    /// Create a new supplier.
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id))]
    pub async fn create_supplier(&self, input: &CreateSupplier) -> Result<Supplier, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_supplier"])
            .start_timer();

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (supplier_id, owner_id, name, default_currency)
            VALUES ($1, $2, $3, $4)
            RETURNING supplier_id, owner_id, name, default_currency, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(&input.name)
        .bind(&input.default_currency)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create supplier: {}", e))
        })?;

        timer.observe_duration();

        info!(supplier_id = %supplier.supplier_id, "Supplier created");

        Ok(supplier)
    }

    /// Get a supplier by ID.
    #[instrument(skip(self), fields(owner_id = %owner_id, supplier_id = %supplier_id))]
    pub async fn get_supplier(
        &self,
        owner_id: Uuid,
        supplier_id: Uuid,
    ) -> Result<Option<Supplier>, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT supplier_id, owner_id, name, default_currency, created_utc
            FROM suppliers
            WHERE owner_id = $1 AND supplier_id = $2
            "#,
        )
        .bind(owner_id)
        .bind(supplier_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get supplier: {}", e)))?;

        Ok(supplier)
    }

    /// List suppliers, paginated, with the total row count.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list_suppliers(
        &self,
        owner_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Supplier>, i64), AppError> {
        let (_, limit, offset) = clamp_page(page, limit);

        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT supplier_id, owner_id, name, default_currency, created_utc
            FROM suppliers
            WHERE owner_id = $1
            ORDER BY name, supplier_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list suppliers: {}", e))
        })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count suppliers: {}", e))
            })?;

        Ok((suppliers, total))
    }

    // -------------------------------------------------------------------------
    // Job Operations
    // -------------------------------------------------------------------------

    /// Create a new job. `total_amount` has already been derived from the
    /// pricing type by the caller.
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id, client_id = %input.client_id))]
    pub async fn create_job(&self, input: &CreateJob) -> Result<Job, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_job"])
            .start_timer();

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (job_id, owner_id, client_id, job_code, title, currency,
                quantity, rate, pricing_type, total_amount, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'created', $11)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(input.client_id)
        .bind(&input.job_code)
        .bind(&input.title)
        .bind(&input.currency)
        .bind(input.quantity)
        .bind(input.rate)
        .bind(input.pricing_type.as_str())
        .bind(input.total_amount)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create job: {}", e)))?;

        timer.observe_duration();

        info!(job_id = %job.job_id, job_code = %job.job_code, "Job created");

        Ok(job)
    }

    /// Get a job by ID.
    #[instrument(skip(self), fields(owner_id = %owner_id, job_id = %job_id))]
    pub async fn get_job(&self, owner_id: Uuid, job_id: Uuid) -> Result<Option<Job>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_job"])
            .start_timer();

        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE owner_id = $1 AND job_id = $2"
        ))
        .bind(owner_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get job: {}", e)))?;

        timer.observe_duration();

        Ok(job)
    }

    /// List jobs, paginated, with the total matching row count.
    #[instrument(skip(self, filter), fields(owner_id = %owner_id))]
    pub async fn list_jobs(
        &self,
        owner_id: Uuid,
        filter: &ListJobsFilter,
    ) -> Result<(Vec<Job>, i64), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_jobs"])
            .start_timer();

        let (_, limit, offset) = clamp_page(filter.page, filter.limit);
        let status_str = filter.status.map(|s| s.as_str().to_string());

        let jobs = sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE owner_id = $1
              AND ($2::varchar IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
            ORDER BY created_utc DESC, job_id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(owner_id)
        .bind(&status_str)
        .bind(filter.client_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list jobs: {}", e)))?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM jobs
            WHERE owner_id = $1
              AND ($2::varchar IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
            "#,
        )
        .bind(owner_id)
        .bind(&status_str)
        .bind(filter.client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count jobs: {}", e)))?;

        timer.observe_duration();

        Ok((jobs, total))
    }

    /// Update a job's title, notes, or status. Status changes to `invoiced`
    /// are reserved for invoice generation.
    #[instrument(skip(self, input), fields(owner_id = %owner_id, job_id = %job_id))]
    pub async fn update_job(
        &self,
        owner_id: Uuid,
        job_id: Uuid,
        input: &UpdateJob,
    ) -> Result<Option<Job>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_job"])
            .start_timer();

        if input.status == Some(JobStatus::Invoiced) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Job status 'invoiced' is set by invoice generation only"
            )));
        }

        let status_str = input.status.map(|s| s.as_str().to_string());
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET title = COALESCE($3, title),
                status = COALESCE($4, status),
                notes = COALESCE($5, notes)
            WHERE owner_id = $1 AND job_id = $2
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(job_id)
        .bind(&input.title)
        .bind(&status_str)
        .bind(&input.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update job: {}", e)))?;

        timer.observe_duration();

        Ok(job)
    }

    // -------------------------------------------------------------------------
    // Quote Operations
    // -------------------------------------------------------------------------

    /// Create a quote together with its line items in one transaction.
    /// Amounts and the total are computed here, never taken from the caller.
    #[instrument(skip(self, items, notes), fields(owner_id = %owner_id, client_id = %client_id))]
    pub async fn create_quote(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        currency: &str,
        notes: Option<&str>,
        items: &[CreateQuoteItem],
    ) -> Result<(Quote, Vec<QuoteItem>), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_quote"])
            .start_timer();

        let amounts: Vec<Decimal> = items
            .iter()
            .map(|item| line_amount(item.quantity, item.rate))
            .collect();
        let total = subtotal(amounts.iter().copied());

        let mut tx = self.pool.begin().await?;

        let quote = sqlx::query_as::<_, Quote>(&format!(
            r#"
            INSERT INTO quotes (quote_id, owner_id, client_id, quote_number, currency, status, total, notes)
            VALUES ($1, $2, $3, next_quote_number($2), $4, 'draft', $5, $6)
            RETURNING {QUOTE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(client_id)
        .bind(currency)
        .bind(total)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create quote: {}", e)))?;

        let mut quote_items = Vec::with_capacity(items.len());
        for (idx, (item, amount)) in items.iter().zip(amounts.iter()).enumerate() {
            let quote_item = sqlx::query_as::<_, QuoteItem>(&format!(
                r#"
                INSERT INTO quote_items (quote_item_id, quote_id, description, quantity, rate, amount, sort_order)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {QUOTE_ITEM_COLUMNS}
                "#
            ))
            .bind(Uuid::new_v4())
            .bind(quote.quote_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.rate)
            .bind(amount)
            .bind(idx as i32)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create quote item: {}", e))
            })?;
            quote_items.push(quote_item);
        }

        tx.commit().await?;

        timer.observe_duration();

        info!(
            quote_id = %quote.quote_id,
            quote_number = %quote.quote_number,
            total = %quote.total,
            "Quote created"
        );

        Ok((quote, quote_items))
    }

    /// Get a quote by ID.
    #[instrument(skip(self), fields(owner_id = %owner_id, quote_id = %quote_id))]
    pub async fn get_quote(
        &self,
        owner_id: Uuid,
        quote_id: Uuid,
    ) -> Result<Option<Quote>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_quote"])
            .start_timer();

        let quote = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE owner_id = $1 AND quote_id = $2"
        ))
        .bind(owner_id)
        .bind(quote_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get quote: {}", e)))?;

        timer.observe_duration();

        Ok(quote)
    }

    /// Get line items for a quote.
    #[instrument(skip(self), fields(quote_id = %quote_id))]
    pub async fn get_quote_items(&self, quote_id: Uuid) -> Result<Vec<QuoteItem>, AppError> {
        let items = sqlx::query_as::<_, QuoteItem>(&format!(
            "SELECT {QUOTE_ITEM_COLUMNS} FROM quote_items WHERE quote_id = $1 ORDER BY sort_order"
        ))
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get quote items: {}", e))
        })?;

        Ok(items)
    }

    /// List quotes, paginated, with the total matching row count.
    #[instrument(skip(self, filter), fields(owner_id = %owner_id))]
    pub async fn list_quotes(
        &self,
        owner_id: Uuid,
        filter: &ListQuotesFilter,
    ) -> Result<(Vec<Quote>, i64), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_quotes"])
            .start_timer();

        let (_, limit, offset) = clamp_page(filter.page, filter.limit);
        let status_str = filter.status.map(|s| s.as_str().to_string());

        let quotes = sqlx::query_as::<_, Quote>(&format!(
            r#"
            SELECT {QUOTE_COLUMNS}
            FROM quotes
            WHERE owner_id = $1
              AND ($2::varchar IS NULL OR status = $2)
            ORDER BY created_utc DESC, quote_id
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(owner_id)
        .bind(&status_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list quotes: {}", e)))?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM quotes
            WHERE owner_id = $1
              AND ($2::varchar IS NULL OR status = $2)
            "#,
        )
        .bind(owner_id)
        .bind(&status_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count quotes: {}", e)))?;

        timer.observe_duration();

        Ok((quotes, total))
    }

    /// Update a quote's notes or status. A status change goes through the
    /// lifecycle transition rules; the row stays locked between the check
    /// and the write so concurrent updates cannot both pass the check.
    #[instrument(skip(self, input), fields(owner_id = %owner_id, quote_id = %quote_id))]
    pub async fn update_quote(
        &self,
        owner_id: Uuid,
        quote_id: Uuid,
        input: &UpdateQuote,
    ) -> Result<Option<Quote>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_quote"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE owner_id = $1 AND quote_id = $2 FOR UPDATE"
        ))
        .bind(owner_id)
        .bind(quote_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get quote: {}", e)))?;

        let existing = match existing {
            Some(q) => q,
            None => return Ok(None),
        };

        let new_status = match input.status {
            Some(target) => {
                let current = QuoteStatus::parse(&existing.status).ok_or_else(|| {
                    AppError::InternalError(anyhow::anyhow!(
                        "Stored quote status '{}' is not recognized",
                        existing.status
                    ))
                })?;
                let next = current
                    .transition_to(target)
                    .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;
                Some(next.as_str().to_string())
            }
            None => None,
        };

        let quote = sqlx::query_as::<_, Quote>(&format!(
            r#"
            UPDATE quotes
            SET status = COALESCE($3, status),
                notes = COALESCE($4, notes)
            WHERE owner_id = $1 AND quote_id = $2
            RETURNING {QUOTE_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(quote_id)
        .bind(&new_status)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update quote: {}", e)))?;

        tx.commit().await?;

        timer.observe_duration();

        info!(quote_id = %quote.quote_id, status = %quote.status, "Quote updated");

        Ok(Some(quote))
    }

    /// Convert an accepted-able quote into a job.
    ///
    /// In one transaction: the quote row is locked, a job is created carrying
    /// over client, currency, and total, and the quote transitions to
    /// `accepted`. Returns `Ok(None)` when the quote does not exist.
    #[instrument(skip(self), fields(owner_id = %owner_id, quote_id = %quote_id))]
    pub async fn convert_quote(
        &self,
        owner_id: Uuid,
        quote_id: Uuid,
    ) -> Result<Option<Job>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["convert_quote"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        let quote = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE owner_id = $1 AND quote_id = $2 FOR UPDATE"
        ))
        .bind(owner_id)
        .bind(quote_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get quote: {}", e)))?;

        let quote = match quote {
            Some(q) => q,
            None => return Ok(None),
        };

        let current = QuoteStatus::parse(&quote.status).ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Stored quote status '{}' is not recognized",
                quote.status
            ))
        })?;
        let accepted = current
            .transition_to(QuoteStatus::Accepted)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (job_id, owner_id, client_id, job_code, title, currency,
                quantity, rate, pricing_type, total_amount, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, NULL, NULL, $7, $8, 'created', $9)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(quote.client_id)
        .bind(generate_job_code())
        .bind(format!("Job from quote {}", quote.quote_number))
        .bind(&quote.currency)
        .bind(PricingType::FlatFee.as_str())
        .bind(quote.total)
        .bind(format!("Converted from quote {}", quote.quote_number))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create job: {}", e)))?;

        sqlx::query("UPDATE quotes SET status = $3 WHERE owner_id = $1 AND quote_id = $2")
            .bind(owner_id)
            .bind(quote_id)
            .bind(accepted.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to accept quote: {}", e))
            })?;

        tx.commit().await?;

        timer.observe_duration();

        info!(
            quote_id = %quote_id,
            job_id = %job.job_id,
            total = %job.total_amount,
            "Quote converted to job"
        );

        Ok(Some(job))
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// Create an invoice together with its line items in one transaction.
    /// Subtotal and total are recomputed from the items and tax amount.
    #[instrument(skip(self, items, notes), fields(owner_id = %owner_id, client_id = %client_id))]
    pub async fn create_invoice(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        currency: &str,
        tax_amount: Decimal,
        due_date: Option<NaiveDate>,
        notes: Option<&str>,
        items: &[CreateInvoiceItem],
    ) -> Result<(Invoice, Vec<InvoiceItem>), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let amounts: Vec<Decimal> = items
            .iter()
            .map(|item| line_amount(item.quantity, item.rate))
            .collect();
        let sub = subtotal(amounts.iter().copied());
        let total = invoice_total(sub, tax_amount);

        let mut tx = self.pool.begin().await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (invoice_id, owner_id, client_id, invoice_number, currency,
                status, subtotal, tax_amount, total, issue_date, due_date, notes)
            VALUES ($1, $2, $3, next_invoice_number($2), $4, 'draft', $5, $6, $7, $8, $9, $10)
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(client_id)
        .bind(currency)
        .bind(sub)
        .bind(tax_amount)
        .bind(total)
        .bind(Utc::now().date_naive())
        .bind(due_date)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e))
        })?;

        let invoice_items = insert_invoice_items(&mut tx, invoice.invoice_id, items, &amounts).await?;

        tx.commit().await?;

        timer.observe_duration();

        info!(
            invoice_id = %invoice.invoice_id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total,
            "Invoice created"
        );

        Ok((invoice, invoice_items))
    }

    /// Generate one invoice from a batch of jobs belonging to one client.
    ///
    /// Validation order is significant and each failure carries its own
    /// message. The candidate jobs are locked for the duration of the
    /// transaction so concurrent generation over overlapping ids cannot
    /// double-invoice a job.
    #[instrument(skip(self, job_ids), fields(owner_id = %owner_id, client_id = %client_id))]
    pub async fn generate_invoice(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        job_ids: &[Uuid],
    ) -> Result<(Invoice, Vec<InvoiceItem>), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["generate_invoice"])
            .start_timer();

        if job_ids.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!("No jobs selected")));
        }

        let mut tx = self.pool.begin().await?;

        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE owner_id = $1 AND job_id = ANY($2) FOR UPDATE"
        ))
        .bind(owner_id)
        .bind(job_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch jobs: {}", e)))?;

        // Fetched rows are distinct, so a repeated id in the request also
        // fails this count check.
        if jobs.len() != job_ids.len() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Some jobs could not be found or you don't have access to them"
            )));
        }

        if jobs.iter().any(|job| job.client_id != client_id) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "All jobs must belong to the same client"
            )));
        }

        let reference_currency = jobs[0].currency.clone();
        if jobs.iter().any(|job| job.currency != reference_currency) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "All jobs must have the same currency"
            )));
        }

        if jobs.iter().any(|job| job.invoice_id.is_some()) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Some jobs have already been invoiced"
            )));
        }

        // One line item per job, in the requested order.
        let mut ordered_jobs = Vec::with_capacity(job_ids.len());
        for id in job_ids {
            let job = jobs
                .iter()
                .find(|j| j.job_id == *id)
                .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Job vanished mid-batch")))?;
            ordered_jobs.push(job);
        }

        let items: Vec<CreateInvoiceItem> = ordered_jobs
            .iter()
            .map(|job| CreateInvoiceItem {
                description: if job.job_code.is_empty() {
                    job.title.clone()
                } else {
                    format!("[{}] {}", job.job_code, job.title)
                },
                quantity: job.quantity.unwrap_or(Decimal::ONE),
                rate: job.rate.unwrap_or(Decimal::ZERO),
            })
            .collect();
        let amounts: Vec<Decimal> = ordered_jobs.iter().map(|job| job.total_amount).collect();
        let total = subtotal(amounts.iter().copied());
        let due_date = Utc::now().date_naive() + Duration::days(30);

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (invoice_id, owner_id, client_id, invoice_number, currency,
                status, subtotal, tax_amount, total, issue_date, due_date)
            VALUES ($1, $2, $3, next_invoice_number($2), $4, 'draft', $5, 0, $5, $6, $7)
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(client_id)
        .bind(&reference_currency)
        .bind(total)
        .bind(Utc::now().date_naive())
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e))
        })?;

        let invoice_items = insert_invoice_items(&mut tx, invoice.invoice_id, &items, &amounts).await?;

        let updated = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'invoiced', invoice_id = $3
            WHERE owner_id = $1 AND job_id = ANY($2)
            "#,
        )
        .bind(owner_id)
        .bind(job_ids)
        .bind(invoice.invoice_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update jobs: {}", e)))?;

        if updated.rows_affected() != job_ids.len() as u64 {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Job update count mismatch during invoice generation"
            )));
        }

        tx.commit().await?;

        timer.observe_duration();

        info!(
            invoice_id = %invoice.invoice_id,
            invoice_number = %invoice.invoice_number,
            jobs = job_ids.len(),
            total = %invoice.total,
            "Invoice generated from jobs"
        );

        Ok((invoice, invoice_items))
    }

    /// Get an invoice by ID.
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn get_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE owner_id = $1 AND invoice_id = $2"
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        Ok(invoice)
    }

    /// Get line items for an invoice.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice_items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, AppError> {
        let items = sqlx::query_as::<_, InvoiceItem>(&format!(
            "SELECT {INVOICE_ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = $1 ORDER BY sort_order"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice items: {}", e))
        })?;

        Ok(items)
    }

    /// List invoices, paginated, with the total matching row count.
    #[instrument(skip(self, filter), fields(owner_id = %owner_id))]
    pub async fn list_invoices(
        &self,
        owner_id: Uuid,
        filter: &ListInvoicesFilter,
    ) -> Result<(Vec<Invoice>, i64), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let (_, limit, offset) = clamp_page(filter.page, filter.limit);
        let status_str = filter.status.map(|s| s.as_str().to_string());

        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE owner_id = $1
              AND ($2::varchar IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
            ORDER BY created_utc DESC, invoice_id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(owner_id)
        .bind(&status_str)
        .bind(filter.client_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM invoices
            WHERE owner_id = $1
              AND ($2::varchar IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
            "#,
        )
        .bind(owner_id)
        .bind(&status_str)
        .bind(filter.client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to count invoices: {}", e))
        })?;

        timer.observe_duration();

        Ok((invoices, total))
    }

    /// Update an invoice's status, due date, or notes. Status changes go
    /// through the lifecycle transition rules, with the row locked between
    /// the check and the write; nothing here transitions an invoice to
    /// `paid` automatically.
    #[instrument(skip(self, input), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn update_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        input: &UpdateInvoice,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE owner_id = $1 AND invoice_id = $2 FOR UPDATE"
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        let existing = match existing {
            Some(inv) => inv,
            None => return Ok(None),
        };

        let new_status = match input.status {
            Some(target) => {
                let current = InvoiceStatus::parse(&existing.status).ok_or_else(|| {
                    AppError::InternalError(anyhow::anyhow!(
                        "Stored invoice status '{}' is not recognized",
                        existing.status
                    ))
                })?;
                let next = current
                    .transition_to(target)
                    .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;
                Some(next.as_str().to_string())
            }
            None => None,
        };

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET status = COALESCE($3, status),
                due_date = COALESCE($4, due_date),
                notes = COALESCE($5, notes)
            WHERE owner_id = $1 AND invoice_id = $2
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .bind(&new_status)
        .bind(input.due_date)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice: {}", e))
        })?;

        tx.commit().await?;

        timer.observe_duration();

        info!(invoice_id = %invoice.invoice_id, status = %invoice.status, "Invoice updated");

        Ok(Some(invoice))
    }

    // -------------------------------------------------------------------------
    // Payment Operations
    // -------------------------------------------------------------------------

    /// Record a payment against an invoice. Overpayment is accepted; the
    /// invoice row itself is never mutated here. Callers verify invoice
    /// ownership before recording.
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id, invoice_id = %input.invoice_id))]
    pub async fn create_payment(&self, input: &CreatePayment) -> Result<Payment, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_payment"])
            .start_timer();

        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (payment_id, owner_id, invoice_id, amount, payment_date, method, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(input.invoice_id)
        .bind(input.amount)
        .bind(input.payment_date)
        .bind(&input.method)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to record payment: {}", e))
        })?;

        timer.observe_duration();

        info!(
            payment_id = %payment.payment_id,
            invoice_id = %payment.invoice_id,
            amount = %payment.amount,
            "Payment recorded"
        );

        Ok(payment)
    }

    /// List payments for one invoice, oldest first.
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn list_payments(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE owner_id = $1 AND invoice_id = $2
            ORDER BY payment_date, created_utc
            "#
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list payments: {}", e)))?;

        Ok(payments)
    }

    // -------------------------------------------------------------------------
    // Expense Operations
    // -------------------------------------------------------------------------

    /// Record an expense.
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id))]
    pub async fn create_expense(&self, input: &CreateExpense) -> Result<Expense, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_expense"])
            .start_timer();

        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (expense_id, owner_id, description, category, amount, currency, expense_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING expense_id, owner_id, description, category, amount, currency, expense_date, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.amount)
        .bind(&input.currency)
        .bind(input.expense_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create expense: {}", e)))?;

        timer.observe_duration();

        info!(expense_id = %expense.expense_id, amount = %expense.amount, "Expense recorded");

        Ok(expense)
    }

    /// List expenses, paginated, with the total row count.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list_expenses(
        &self,
        owner_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Expense>, i64), AppError> {
        let (_, limit, offset) = clamp_page(page, limit);

        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT expense_id, owner_id, description, category, amount, currency, expense_date, created_utc
            FROM expenses
            WHERE owner_id = $1
            ORDER BY expense_date DESC, expense_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list expenses: {}", e)))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count expenses: {}", e))
            })?;

        Ok((expenses, total))
    }

    // -------------------------------------------------------------------------
    // Outsourcing Operations
    // -------------------------------------------------------------------------

    /// Create an outsourcing record.
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id, job_id = %input.job_id))]
    pub async fn create_outsourcing(
        &self,
        input: &CreateOutsourcing,
    ) -> Result<Outsourcing, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_outsourcing"])
            .start_timer();

        let record = sqlx::query_as::<_, Outsourcing>(
            r#"
            INSERT INTO outsourcing (outsourcing_id, owner_id, job_id, supplier_id,
                supplier_rate, supplier_currency, supplier_total, paid, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8)
            RETURNING outsourcing_id, owner_id, job_id, supplier_id, supplier_rate,
                supplier_currency, supplier_total, paid, notes, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(input.job_id)
        .bind(input.supplier_id)
        .bind(input.supplier_rate)
        .bind(&input.supplier_currency)
        .bind(input.supplier_total)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create outsourcing: {}", e))
        })?;

        timer.observe_duration();

        info!(
            outsourcing_id = %record.outsourcing_id,
            supplier_total = %record.supplier_total,
            "Outsourcing record created"
        );

        Ok(record)
    }

    /// List outsourcing records, paginated, optionally filtered by paid flag.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list_outsourcing(
        &self,
        owner_id: Uuid,
        paid: Option<bool>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Outsourcing>, i64), AppError> {
        let (_, limit, offset) = clamp_page(page, limit);

        let records = sqlx::query_as::<_, Outsourcing>(
            r#"
            SELECT outsourcing_id, owner_id, job_id, supplier_id, supplier_rate,
                supplier_currency, supplier_total, paid, notes, created_utc
            FROM outsourcing
            WHERE owner_id = $1
              AND ($2::bool IS NULL OR paid = $2)
            ORDER BY created_utc DESC, outsourcing_id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id)
        .bind(paid)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list outsourcing: {}", e))
        })?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM outsourcing
            WHERE owner_id = $1
              AND ($2::bool IS NULL OR paid = $2)
            "#,
        )
        .bind(owner_id)
        .bind(paid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to count outsourcing: {}", e))
        })?;

        Ok((records, total))
    }

    /// Update the paid flag or notes on an outsourcing record.
    #[instrument(skip(self, input), fields(owner_id = %owner_id, outsourcing_id = %outsourcing_id))]
    pub async fn update_outsourcing(
        &self,
        owner_id: Uuid,
        outsourcing_id: Uuid,
        input: &UpdateOutsourcing,
    ) -> Result<Option<Outsourcing>, AppError> {
        let record = sqlx::query_as::<_, Outsourcing>(
            r#"
            UPDATE outsourcing
            SET paid = COALESCE($3, paid),
                notes = COALESCE($4, notes)
            WHERE owner_id = $1 AND outsourcing_id = $2
            RETURNING outsourcing_id, owner_id, job_id, supplier_id, supplier_rate,
                supplier_currency, supplier_total, paid, notes, created_utc
            "#,
        )
        .bind(owner_id)
        .bind(outsourcing_id)
        .bind(input.paid)
        .bind(&input.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update outsourcing: {}", e))
        })?;

        if let Some(ref rec) = record {
            info!(outsourcing_id = %rec.outsourcing_id, paid = rec.paid, "Outsourcing updated");
        }

        Ok(record)
    }

    /// Delete an outsourcing record.
    #[instrument(skip(self), fields(owner_id = %owner_id, outsourcing_id = %outsourcing_id))]
    pub async fn delete_outsourcing(
        &self,
        owner_id: Uuid,
        outsourcing_id: Uuid,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM outsourcing WHERE owner_id = $1 AND outsourcing_id = $2")
                .bind(owner_id)
                .bind(outsourcing_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to delete outsourcing: {}", e))
                })?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(outsourcing_id = %outsourcing_id, "Outsourcing record deleted");
        }

        Ok(deleted)
    }

    // -------------------------------------------------------------------------
    // Report Queries
    // -------------------------------------------------------------------------

    /// Currency/total pairs for paid invoices.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn revenue_rows(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<(Option<String>, Decimal)>, AppError> {
        let rows = sqlx::query_as::<_, (Option<String>, Decimal)>(
            "SELECT currency, total FROM invoices WHERE owner_id = $1 AND status = 'paid'",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch revenue rows: {}", e))
        })?;

        Ok(rows)
    }

    /// Currency/amount pairs for all outsourcing hand-offs.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn supplier_cost_rows(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<(Option<String>, Decimal)>, AppError> {
        let rows = sqlx::query_as::<_, (Option<String>, Decimal)>(
            "SELECT supplier_currency, supplier_total FROM outsourcing WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch supplier cost rows: {}", e))
        })?;

        Ok(rows)
    }

    /// Currency/amount pairs for unpaid outsourcing hand-offs.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn pending_outsourcing_rows(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<(Option<String>, Decimal)>, AppError> {
        let rows = sqlx::query_as::<_, (Option<String>, Decimal)>(
            r#"
            SELECT supplier_currency, supplier_total
            FROM outsourcing
            WHERE owner_id = $1 AND paid = FALSE
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Failed to fetch pending outsourcing rows: {}",
                e
            ))
        })?;

        Ok(rows)
    }

    /// Currency/amount pairs for recorded expenses.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn expense_rows(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<(Option<String>, Decimal)>, AppError> {
        let rows = sqlx::query_as::<_, (Option<String>, Decimal)>(
            "SELECT currency, amount FROM expenses WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch expense rows: {}", e))
        })?;

        Ok(rows)
    }

    /// Currency/outstanding pairs for sent and overdue invoices. The
    /// outstanding balance is recomputed from current rows, never persisted,
    /// and never clamped at zero.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn outstanding_rows(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<(Option<String>, Decimal)>, AppError> {
        let rows = sqlx::query_as::<_, (Option<String>, Decimal)>(
            r#"
            SELECT i.currency, i.total - COALESCE(SUM(p.amount), 0)
            FROM invoices i
            LEFT JOIN payments p ON p.invoice_id = i.invoice_id
            WHERE i.owner_id = $1 AND i.status IN ('sent', 'overdue')
            GROUP BY i.invoice_id, i.currency, i.total
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch outstanding rows: {}", e))
        })?;

        Ok(rows)
    }
}

/// Insert precomputed line items for an invoice inside an open transaction.
async fn insert_invoice_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    invoice_id: Uuid,
    items: &[CreateInvoiceItem],
    amounts: &[Decimal],
) -> Result<Vec<InvoiceItem>, AppError> {
    let mut invoice_items = Vec::with_capacity(items.len());
    for (idx, (item, amount)) in items.iter().zip(amounts.iter()).enumerate() {
        let invoice_item = sqlx::query_as::<_, InvoiceItem>(&format!(
            r#"
            INSERT INTO invoice_items (invoice_item_id, invoice_id, description, quantity, rate, amount, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {INVOICE_ITEM_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(invoice_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.rate)
        .bind(amount)
        .bind(idx as i32)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice item: {}", e))
        })?;
        invoice_items.push(invoice_item);
    }
    Ok(invoice_items)
}

#[cfg(test)]
mod tests {
    use super::generate_job_code;
    use chrono::{Datelike, Utc};

    #[test]
    fn job_code_is_year_plus_four_digits() {
        let code = generate_job_code();
        let (year, suffix) = code.split_once('-').expect("code has a dash");
        assert_eq!(year, Utc::now().year().to_string());
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
