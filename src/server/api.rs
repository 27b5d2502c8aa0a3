//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslationError;
use crate::core::models::{
    Language, ProviderKind, TranslatableColumns, TranslationResults, Workbook,
};
use crate::pipeline::orchestrator::WorkbookTranslator;

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: WorkbookTranslator,
    provider: ProviderKind,
}

impl AppState {
    pub fn new(translator: WorkbookTranslator, provider: ProviderKind) -> Self {
        Self {
            translator,
            provider,
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    provider: ProviderKind,
    configured: bool,
    timestamp: i64,
}

/// Languages list response
#[derive(Serialize)]
struct LanguagesResponse {
    provider: ProviderKind,
    data: Vec<Language>,
}

/// Workbook translation request
#[derive(Deserialize)]
pub struct TranslateWorkbookRequest {
    pub workbook: Workbook,
    pub target_langs: Vec<String>,
    /// Column allow-list; absent means every column
    pub columns: Option<Vec<String>>,
    /// Use the standard assessment columns instead of `columns`
    #[serde(default)]
    pub assessment_columns: bool,
}

impl TranslateWorkbookRequest {
    fn allow_list(&self) -> Option<TranslatableColumns> {
        if self.assessment_columns {
            Some(TranslatableColumns::assessment())
        } else {
            self.columns.as_ref().map(TranslatableColumns::new)
        }
    }
}

/// Workbook translation response
#[derive(Serialize)]
pub struct TranslateWorkbookResponse {
    pub provider: ProviderKind,
    pub results: TranslationResults,
}

#[derive(Serialize)]
struct ResetResponse {
    status: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: &TranslationError) -> ApiError {
    let (status, code, kind) = match err {
        TranslationError::InputError { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_request", "invalid_request_error")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "translation_error", "api_error"),
    };
    (
        status,
        Json(ErrorResponse {
            error: ErrorDetail {
                message: err.to_string(),
                code: Some(code.to_string()),
                r#type: Some(kind.to_string()),
            },
        }),
    )
}

/// Health check handler
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "assessment-translator".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.provider,
        configured: state.translator.provider().is_configured(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Supported languages of the active provider
async fn get_languages(State(state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        provider: state.provider,
        data: state.provider.languages().to_vec(),
    })
}

/// Translate a whole workbook into every requested language
async fn translate_workbook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateWorkbookRequest>,
) -> Result<Json<TranslateWorkbookResponse>, ApiError> {
    let columns = payload.allow_list();

    match state
        .translator
        .translate_workbook(&payload.workbook, &payload.target_langs, columns.as_ref())
        .await
    {
        Ok(results) => Ok(Json(TranslateWorkbookResponse {
            provider: state.provider,
            results,
        })),
        Err(e) => {
            warn!("Workbook translation rejected: {}", e);
            Err(error_response(&e))
        }
    }
}

/// End the session: forget resolved endpoints
async fn reset(State(state): State<Arc<AppState>>) -> Json<ResetResponse> {
    state.translator.reset().await;
    Json(ResetResponse {
        status: "reset".to_string(),
    })
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/v1/languages", get(get_languages))
        .route("/v1/translate", post(translate_workbook))
        .route("/v1/reset", post(reset))
        .with_state(Arc::new(state))
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16, config: TranslatorConfig) -> anyhow::Result<()> {
    let translator = WorkbookTranslator::from_config(&config)?;
    let app = router(AppState::new(translator, config.provider));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {} ({} provider)", addr, config.provider);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
