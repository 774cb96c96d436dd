//! Read-side HTTP service: serves live company data from the upstream API with
//! stored insights merged in.

pub mod company_routes;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use company_client::CompanyClient;
use insight_core::{InsightError, ServiceConfig};
use insight_store::{InsightDb, InsightStore};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub const SERVICE_NAME: &str = "ML Financial Analysis API";

#[derive(Clone)]
pub struct AppState {
    pub client: CompanyClient,
    pub store: InsightStore,
}

/// Handler error rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{} {:#}", self.status, self.error);
        }
        (self.status, Json(json!({ "detail": format!("{:#}", self.error) }))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<InsightError> for AppError {
    fn from(error: InsightError) -> Self {
        match error {
            InsightError::ApiError(msg) => Self::with_status(
                StatusCode::BAD_GATEWAY,
                anyhow::anyhow!("External API error: {}", msg),
            ),
            other => Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, other.into()),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "ML Financial Analysis API", version = "1.0.0"),
    paths(company_routes::get_company_analysis, health_check),
    tags((name = "Company", description = "Company data with scored insights"))
)]
pub struct ApiDoc;

/// Service health
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up")),
    tag = "Company"
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the router with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/openapi.json", get(openapi_json))
        .merge(company_routes::company_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=info,tower_http=info,company_client=warn".into()),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let db = InsightDb::new(&config.database_url).await?;
    let state = AppState {
        client: CompanyClient::from_config(&config),
        store: InsightStore::new(db),
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("{} listening on http://{}", SERVICE_NAME, addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
