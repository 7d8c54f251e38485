//! Application wiring: shared state, the router, and the bound listener.

use axum::middleware::from_fn;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::services::metrics::metrics_middleware;
use crate::services::{self, Database};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

pub struct Application {
    port: u16,
    router: Router,
    listener: tokio::net::TcpListener,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        db.run_migrations().await?;

        services::init_metrics();

        let state = AppState {
            db,
            config: config.clone(),
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics))
            // Clients and suppliers
            .route(
                "/clients",
                post(handlers::clients::create_client).get(handlers::clients::list_clients),
            )
            .route("/clients/:id", get(handlers::clients::get_client))
            .route(
                "/suppliers",
                post(handlers::suppliers::create_supplier)
                    .get(handlers::suppliers::list_suppliers),
            )
            .route("/suppliers/:id", get(handlers::suppliers::get_supplier))
            // Quotes
            .route(
                "/quotes",
                post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes),
            )
            .route(
                "/quotes/:id",
                get(handlers::quotes::get_quote).patch(handlers::quotes::update_quote),
            )
            .route("/quotes/:id/convert", post(handlers::quotes::convert_quote))
            // Jobs
            .route(
                "/jobs",
                post(handlers::jobs::create_job).get(handlers::jobs::list_jobs),
            )
            .route(
                "/jobs/:id",
                get(handlers::jobs::get_job).patch(handlers::jobs::update_job),
            )
            // Invoices
            .route(
                "/invoices",
                post(handlers::invoices::create_invoice).get(handlers::invoices::list_invoices),
            )
            .route(
                "/invoices/generate",
                post(handlers::invoices::generate_invoice),
            )
            .route(
                "/invoices/:id",
                get(handlers::invoices::get_invoice).patch(handlers::invoices::update_invoice),
            )
            // Payments
            .route(
                "/payments",
                post(handlers::payments::create_payment).get(handlers::payments::list_payments),
            )
            // Expenses
            .route(
                "/expenses",
                post(handlers::expenses::create_expense).get(handlers::expenses::list_expenses),
            )
            // Outsourcing
            .route(
                "/outsourcing",
                post(handlers::outsourcing::create_outsourcing)
                    .get(handlers::outsourcing::list_outsourcing),
            )
            .route(
                "/outsourcing/:id",
                patch(handlers::outsourcing::update_outsourcing)
                    .delete(handlers::outsourcing::delete_outsourcing),
            )
            // Reports
            .route("/reports", get(handlers::reports::reports))
            .layer(from_fn(metrics_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                }),
            )
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            router,
            listener,
        })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
