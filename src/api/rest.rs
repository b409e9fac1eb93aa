// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. Analysis endpoints are public; the
// endpoints with side effects or operational detail (report writing, error
// log) require a Bearer token checked via the `AuthBearer` extractor.
//
// CORS is configured permissively; tighten `allow_origin` in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::auth::AuthBearer;
use crate::app_state::AppState;
use crate::error::AnalysisError;
use crate::report::{analyze, AnalysisReport, ChartData};
use crate::types::{normalize_ticker, PeriodLabel, PricePoint, PriceSeries};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with tracing + CORS middleware and shared
/// state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        .route("/api/v1/analysis/:ticker", get(analysis))
        .route("/api/v1/analysis/:ticker/summary", get(analysis_summary))
        .route("/api/v1/analyze", post(analyze_series))
        // ── Authenticated ───────────────────────────────────────────
        .route("/api/v1/reports/:ticker", post(write_report))
        .route("/api/v1/errors", get(recent_errors))
        .route("/api/v1/config", get(get_config))
        .route("/api/v1/config", post(update_config))
        // ── Middleware & State ───────────────────────────────────────
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

/// Failure of a request, mapped onto an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    Analysis(AnalysisError),
    Fetch(anyhow::Error),
    ReportingDisabled,
    Report(anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Analysis(AnalysisError::EmptySeries { .. }) => StatusCode::NOT_FOUND,
            Self::Analysis(AnalysisError::UnknownPeriod(_) | AnalysisError::InvalidTicker(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Analysis(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Fetch(_) => StatusCode::BAD_GATEWAY,
            Self::ReportingDisabled => StatusCode::SERVICE_UNAVAILABLE,
            Self::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Analysis(e) => e.to_string(),
            Self::Fetch(e) => format!("price data retrieval failed: {e:#}"),
            Self::ReportingDisabled => "report writing is not configured".to_string(),
            Self::Report(e) => format!("report writing failed: {e:#}"),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        Self::Analysis(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message() });
        (self.status(), axum::Json(body)).into_response()
    }
}

/// Log and record a failed request before handing the error back.
fn record_failure(state: &AppState, ticker: Option<&str>, err: ApiError) -> ApiError {
    let message = err.message();
    warn!(ticker = ?ticker, status = %err.status(), error = %message, "request failed");
    state.push_error(message, ticker.map(str::to_string));
    err
}

// =============================================================================
// Shared analysis path
// =============================================================================

fn resolve_period(state: &AppState, raw: Option<&str>) -> Result<PeriodLabel, ApiError> {
    match raw {
        Some(p) => Ok(p.parse::<PeriodLabel>()?),
        None => Ok(state.config.read().default_period),
    }
}

/// Fetch `ticker` from the configured source and analyse it.
async fn fetch_and_analyze(
    state: &AppState,
    ticker: &str,
    period: Option<&str>,
) -> Result<(PriceSeries, AnalysisReport), ApiError> {
    let run = async {
        let symbol = normalize_ticker(ticker)?;
        let period = resolve_period(state, period)?;
        let series = state
            .source
            .fetch(&symbol, period)
            .await
            .map_err(ApiError::Fetch)?;
        let report = analyze(ticker, period, &series, &state.analysis_params())?;
        Ok::<_, ApiError>((series, report))
    };

    match run.await {
        Ok(out) => {
            let served = state.record_analysis();
            info!(
                ticker = %out.1.ticker,
                period = %out.1.period,
                source = state.source.name(),
                recommendation = %out.1.recommendation,
                rsi_status = %out.1.rsi_status,
                served,
                "analysis served"
            );
            Ok(out)
        }
        Err(e) => Err(record_failure(state, Some(ticker), e)),
    }
}

// =============================================================================
// Health (public)
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    source: &'static str,
    analyses_served: u64,
    reports_enabled: bool,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        source: state.source.name(),
        analyses_served: state.analyses_served(),
        reports_enabled: state.reporter.enabled(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Analysis (public)
// =============================================================================

#[derive(Deserialize)]
struct AnalysisQuery {
    #[serde(default)]
    period: Option<String>,
    /// Include the chart payload (raw prices + overlays).
    #[serde(default)]
    chart: bool,
}

#[derive(Serialize)]
struct AnalysisResponse<'a> {
    report: &'a AnalysisReport,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart: Option<ChartData<'a>>,
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Response, ApiError> {
    let (series, report) = fetch_and_analyze(&state, &ticker, query.period.as_deref()).await?;

    let body = AnalysisResponse {
        report: &report,
        summary: report.summary(),
        chart: query.chart.then(|| ChartData::from_report(&series, &report)),
    };
    Ok(Json(body).into_response())
}

async fn analysis_summary(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<String, ApiError> {
    let (_, report) = fetch_and_analyze(&state, &ticker, query.period.as_deref()).await?;
    Ok(report.narrative())
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    ticker: String,
    #[serde(default)]
    period: Option<String>,
    points: Vec<PricePoint>,
}

/// Analyse a caller-supplied series; nothing is fetched.
async fn analyze_series(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let AnalyzeRequest {
        ticker,
        period,
        points,
    } = req;

    let run = || -> Result<AnalysisReport, ApiError> {
        let period = resolve_period(&state, period.as_deref())?;
        let series = PriceSeries::new(points)?;
        Ok(analyze(&ticker, period, &series, &state.analysis_params())?)
    };

    match run() {
        Ok(report) => {
            state.record_analysis();
            Ok(Json(report))
        }
        Err(e) => Err(record_failure(&state, Some(&ticker), e)),
    }
}

// =============================================================================
// Reports (authenticated)
// =============================================================================

#[derive(Serialize)]
struct ReportResponse {
    ticker: String,
    path: String,
}

async fn write_report(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    if !state.reporter.enabled() {
        return Err(record_failure(&state, Some(&ticker), ApiError::ReportingDisabled));
    }

    let (_, report) = fetch_and_analyze(&state, &ticker, query.period.as_deref()).await?;

    match state.reporter.publish(&report) {
        Ok(Some(path)) => Ok(Json(ReportResponse {
            ticker: report.ticker,
            path: path.display().to_string(),
        })),
        Ok(None) => Err(record_failure(&state, Some(&ticker), ApiError::ReportingDisabled)),
        Err(e) => Err(record_failure(&state, Some(&ticker), ApiError::Report(e))),
    }
}

async fn recent_errors(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let errors = state.recent_errors.read().clone();
    Json(errors)
}

// =============================================================================
// Config (authenticated)
// =============================================================================

async fn get_config(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let config = state.config.read().clone();
    Json(config)
}

#[derive(Deserialize)]
struct ConfigUpdate {
    #[serde(default)]
    ma_windows: Option<Vec<usize>>,
    #[serde(default)]
    rsi_period: Option<usize>,
    #[serde(default)]
    default_period: Option<PeriodLabel>,
}

async fn update_config(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Json(update): Json<ConfigUpdate>,
) -> Response {
    if update.rsi_period == Some(0)
        || update
            .ma_windows
            .as_ref()
            .is_some_and(|w| w.is_empty() || w.contains(&0))
    {
        let body = serde_json::json!({ "error": "windows and periods must be positive" });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }

    let mut config = state.config.write();
    let mut changes = Vec::new();

    macro_rules! apply {
        ($field:ident) => {
            if let Some(val) = update.$field {
                if config.$field != val {
                    changes.push(format!(
                        "{}: {:?} -> {:?}",
                        stringify!($field),
                        config.$field,
                        val
                    ));
                    config.$field = val;
                }
            }
        };
    }

    apply!(ma_windows);
    apply!(rsi_period);
    apply!(default_period);

    if !changes.is_empty() {
        info!(changes = ?changes, "Analyzer config updated");
        // Saved under the write lock so the file never lags a later update.
        // Best-effort; the in-memory config is already live.
        if let Some(path) = &state.config_path {
            if let Err(e) = config.save(path) {
                warn!(error = %e, "Failed to save analyzer config to disk");
            }
        }
    }

    let snapshot = config.clone();
    drop(config);

    let mut response = serde_json::to_value(&snapshot).unwrap_or_default();
    if let Some(obj) = response.as_object_mut() {
        obj.insert(
            "changes".to_string(),
            serde_json::to_value(&changes).unwrap_or_default(),
        );
    }
    Json(response).into_response()
}
