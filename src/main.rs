// ZDS-ZGW Gateway - translates legacy ZDS (StUF/SOAP) traffic into ZGW REST
// calls and answers in kind.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zdsbrug::config::{self, Config};
use zdsbrug::converter::ConverterFactory;
use zdsbrug::cycle::RouteParams;
use zdsbrug::db::PgCycleStore;
use zdsbrug::dispatcher::{CapabilityEntry, Dispatcher};
use zdsbrug::errors::GatewayError;
use zdsbrug::metrics::METRICS;
use zdsbrug::requesthandler::RequestHandlerFactory;
use zdsbrug::trace::LogTracer;
use zdsbrug::zgw::HttpZgwClient;

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    db: PgPool,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    db_connected: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_connected = sqlx::query("SELECT 1").fetch_optional(&state.db).await.is_ok();

    Json(HealthResponse {
        status: if db_connected { "healthy" } else { "degraded" },
        service: "zdsbrug",
        version: env!("CARGO_PKG_VERSION"),
        db_connected,
    })
}

async fn metrics_handler() -> Result<String, GatewayError> {
    METRICS
        .export()
        .map_err(|e| GatewayError::Unknown(format!("Failed to export metrics: {}", e)))
}

/// Does not handle any message; enumerates the configured translations.
async fn handle_capabilities(
    State(state): State<AppState>,
) -> Result<Json<Vec<CapabilityEntry>>, GatewayError> {
    Ok(Json(state.dispatcher.capabilities()?))
}

/// Receives the SOAP requests. The path variables plus the SOAPAction header
/// select the translation; the optional referentienummer query parameter
/// overrides correlation for replayed traffic.
async fn handle_soap(
    State(state): State<AppState>,
    Path((modus, version, protocol, endpoint)): Path<(String, String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, GatewayError> {
    let start = std::time::Instant::now();
    METRICS.requests_total.inc();

    let soap_action = headers
        .get("SOAPAction")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| GatewayError::Validation("Missing SOAPAction header".to_string()))?
        .to_string();
    let referentienummer = params.get("referentienummer").cloned();

    let route = RouteParams {
        modus,
        version,
        protocol,
        endpoint,
    };
    let result = state
        .dispatcher
        .handle(route, &soap_action, body, referentienummer)
        .await;
    METRICS
        .request_duration_seconds
        .observe(start.elapsed().as_secs_f64());

    match result {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::OK);
            Ok((
                status,
                [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
                response.body,
            )
                .into_response())
        }
        Err(err) => {
            METRICS.track_error(&err);
            Err(err)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_line_number(true)
        .init();

    info!("Starting zdsbrug gateway");

    let config = Config::from_env()?;

    info!("Connecting to database");
    let db = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&db).await?;

    let entries = config::load_translations(&config.translations_file)?;
    info!(
        "Loaded {} translations from {}",
        entries.len(),
        config.translations_file
    );

    let converters = ConverterFactory::from_entries(entries)?;
    let client = Arc::new(HttpZgwClient::new(&config.zgw)?);
    let store = Arc::new(PgCycleStore::new(db.clone()));
    let handlers = RequestHandlerFactory::new(store, client);
    let dispatcher = Arc::new(Dispatcher::new(converters, handlers, Arc::new(LogTracer)));

    let state = AppState { dispatcher, db };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(handle_capabilities))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/:modus/:version/:protocol/:endpoint", post(handle_soap))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Gateway listening on {}", config.server.bind_addr);
    info!("  POST /{{modus}}/{{version}}/{{protocol}}/{{endpoint}} - ZDS translation");
    info!("  GET  / - translation capabilities");
    info!("  GET  /health - health check");
    info!("  GET  /metrics - Prometheus metrics");

    axum::serve(listener, app).await?;

    Ok(())
}
