//! HTTP adapter for the wattson consolidation engine.
//!
//! Accepts decoded traces as JSON and returns consolidated intervals, state
//! summaries or the device name. The engine is CPU-bound, so every request
//! runs it on the blocking pool.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use wattson_core::{
    ConsolidateConfig, ConsolidatedInterval, StateSummary, TimeWindow, TraceFile, consolidate,
    device_name, summarize_by_state,
};

/// Shared server state.
struct AppState {
    /// Row cap applied to `/summary` when the request sets none.
    default_summary_limit: usize,
}

#[derive(Deserialize)]
struct ConsolidateRequest {
    trace: TraceFile,
    window: Option<TimeWindow>,
    cores: Option<usize>,
    suspend_overlay: Option<bool>,
    coalesce: Option<bool>,
    /// Only used by `/summary`; 0 returns every state.
    limit: Option<usize>,
}

impl ConsolidateRequest {
    fn config(&self) -> ConsolidateConfig {
        let defaults = ConsolidateConfig::default();
        ConsolidateConfig {
            cores: self.cores,
            suspend_overlay: self.suspend_overlay.unwrap_or(defaults.suspend_overlay),
            coalesce: self.coalesce.unwrap_or(defaults.coalesce),
            window: self.window,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StatesResponse {
    success: bool,
    count: usize,
    intervals: Vec<ConsolidatedInterval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct SummaryResponse {
    success: bool,
    count: usize,
    states: Vec<StateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct DeviceResponse {
    name: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Consolidate on the blocking pool, flattening join and engine errors.
async fn run_engine(req: ConsolidateRequest) -> Result<Vec<ConsolidatedInterval>, String> {
    tokio::task::spawn_blocking(move || {
        let tracks = req.trace.to_track_set()?;
        consolidate(&tracks, &req.config())
    })
    .await
    .map_err(|e| format!("engine task failed: {e}"))?
    .map_err(|e| e.to_string())
}

async fn handle_states(Json(req): Json<ConsolidateRequest>) -> (StatusCode, Json<StatesResponse>) {
    match run_engine(req).await {
        Ok(intervals) => {
            info!("POST /states -> {} intervals", intervals.len());
            (
                StatusCode::OK,
                Json(StatesResponse {
                    success: true,
                    count: intervals.len(),
                    intervals,
                    error: None,
                }),
            )
        }
        Err(e) => {
            warn!("POST /states rejected: {e}");
            (
                StatusCode::BAD_REQUEST,
                Json(StatesResponse {
                    success: false,
                    count: 0,
                    intervals: Vec::new(),
                    error: Some(e),
                }),
            )
        }
    }
}

async fn handle_summary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConsolidateRequest>,
) -> (StatusCode, Json<SummaryResponse>) {
    let limit = req.limit.unwrap_or(state.default_summary_limit);
    match run_engine(req).await {
        Ok(intervals) => {
            let states = summarize_by_state(&intervals, (limit > 0).then_some(limit));
            (
                StatusCode::OK,
                Json(SummaryResponse {
                    success: true,
                    count: states.len(),
                    states,
                    error: None,
                }),
            )
        }
        Err(e) => {
            warn!("POST /summary rejected: {e}");
            (
                StatusCode::BAD_REQUEST,
                Json(SummaryResponse {
                    success: false,
                    count: 0,
                    states: Vec::new(),
                    error: Some(e),
                }),
            )
        }
    }
}

async fn handle_device(Json(trace): Json<TraceFile>) -> Json<DeviceResponse> {
    Json(DeviceResponse {
        name: device_name(&trace.metadata),
    })
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: wattson_core::VERSION.to_string(),
    })
}

/// Build the axum router.
pub fn build_router() -> Router {
    let state = Arc::new(AppState {
        default_summary_limit: 20,
    });

    Router::new()
        .route("/health", get(handle_health))
        .route("/states", post(handle_states))
        .route("/summary", post(handle_summary))
        .route("/device", post(handle_device))
        .with_state(state)
}

/// Run the HTTP server until the listener fails.
pub async fn run_server(host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router();
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await
}
