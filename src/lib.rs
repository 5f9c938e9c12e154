//! # apunto: Document Image Analysis Service
//!
//! `apunto` is an HTTP service that turns a photographed or scanned document
//! into a structured Spanish-language analysis. Clients send a base64 data-URI
//! image plus a free-form description; the service extracts the text with a
//! configurable OCR backend, asks an LLM provider for a structured analysis,
//! and stores the result in an optional Postgres-backed history.
//!
//! ## Pipeline
//!
//! `POST /api/analyze` runs three stages in order:
//!
//! 1. **Decode and validate** the `data:image/...;base64,...` payload
//!    ([`image`]): MIME type check, base64 decode, 10MB size cap.
//! 2. **OCR extraction** ([`ocr`]): one of Azure Document Intelligence
//!    (async submit-then-poll), Google Vision, or a local Tesseract engine,
//!    selected once at startup from configuration. An image with no legible
//!    text is a 400, not a provider error.
//! 3. **LLM analysis** ([`analysis`]): Azure OpenAI or Gemini produce a JSON
//!    analysis (summary, label, entities, key points, tags); malformed model
//!    output is defensively shaped rather than failing the request.
//!
//! The result is then written to the `analysis_history` table on a best-effort
//! basis: a persistence failure is logged and the analysis is still returned.
//! History endpoints (`GET /api/history`, `GET`/`DELETE /api/history/{id}`)
//! page through past analyses, optionally scoped by the advisory `x-user-id`
//! header.
//!
//! ## Running without a database
//!
//! The database is optional. With no `DATABASE_URL` configured (or when the
//! connection fails at startup) the service still serves `/api/analyze` and
//! `/health`; only the history endpoints report unavailability.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use apunto::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = apunto::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     apunto::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod image;
pub mod ocr;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use crate::analysis::DocumentAnalysis;
use crate::api::ApiDoc;
use crate::ocr::TextExtraction;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use bon::Builder;
pub use config::Config;
use serde_json::json;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, info, instrument, Level};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

/// Request body cap, sized for a base64-encoded 10MB image plus JSON overhead.
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across all request handlers.
///
/// The OCR backend and the analyzer are selected once at startup and shared
/// behind trait objects; `db` is `None` when history persistence is disabled.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: Option<PgPool>,
    pub config: Config,
    pub ocr: Arc<dyn TextExtraction>,
    pub analyzer: Arc<dyn DocumentAnalysis>,
}

/// Get the apunto database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect the history pool. A connection failure is not fatal: the service
/// starts with history disabled and logs the reason.
async fn connect_pool(config: &Config) -> Option<PgPool> {
    let database = config.database.as_ref()?;

    let connect = async {
        let mut options = PgConnectOptions::from_str(&database.url)?;
        if database.ssl {
            options = options.ssl_mode(PgSslMode::Require);
        }

        let pool = PgPoolOptions::new()
            .max_connections(database.pool.max_connections)
            .acquire_timeout(Duration::from_secs(database.pool.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(database.pool.idle_timeout_secs))
            .connect_with(options)
            .await?;

        migrator().run(&pool).await?;
        Ok::<_, anyhow::Error>(pool)
    };

    match connect.await {
        Ok(pool) => {
            info!("Connected to database, history enabled");
            Some(pool)
        }
        Err(e) => {
            error!("Could not connect to database, history disabled: {e:#}");
            None
        }
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = if config.cors_origin == "*" {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/analyze", post(api::handlers::analyze::analyze_document))
        .route("/history", get(api::handlers::history::list_history))
        .route(
            "/history/{id}",
            get(api::handlers::history::get_history_item).delete(api::handlers::history::delete_history_item),
        );

    let router = Router::new()
        .route(
            "/health",
            get(|| async { Json(json!({ "status": "ok", "message": "Apunto Backend API" })) }),
        )
        .nest("/api", api_routes)
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/docs"))
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(create_cors_layer(&state.config)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects the optional database, runs
///    migrations, and selects the OCR backend and analysis provider.
/// 2. **Serve**: [`Application::serve`] binds the TCP port and handles
///    requests until the shutdown future resolves.
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = connect_pool(&config).await;

        let ocr = ocr::select_backend(&config.ocr);
        info!(backend = ocr.backend_name(), "OCR backend selected");
        let analyzer = analysis::select_analyzer(&config.llm);

        let state = AppState::builder()
            .maybe_db(pool.clone())
            .config(config.clone())
            .ocr(ocr)
            .analyzer(analyzer)
            .build();

        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Apunto backend listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        Ok(())
    }
}
