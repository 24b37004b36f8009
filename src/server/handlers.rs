use super::AppState;
use crate::constants::headers as header_names;
use crate::error::AppError;
use crate::models::{PhaseInspection, RefreshResult};
use crate::orchestrator::{
    OrchestrationRequest, Outcome, PROGRESS_CHANNEL_CAPACITY, Progress, ProgressEvent,
    ProgressKind,
};
use crate::refresh::Credentials;
use axum::extract::{Extension, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
pub(super) struct LeagueParams {
    league_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RunParams {
    league_id: Option<String>,
    phase: Option<String>,
    include_optional: Option<String>,
    dry_run: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RetryParams {
    league_id: Option<String>,
    endpoint: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::missing_parameter(name))
}

/// Boolean query flag; absent or empty means `false`.
fn flag(value: Option<&str>, name: &str) -> Result<bool, AppError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::invalid_parameter(name, raw)),
    }
}

/// Streaming is requested by `Accept: text/event-stream` or `x-stream: true`.
fn wants_stream(headers: &HeaderMap) -> bool {
    let accepts_sse = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/event-stream"));
    let stream_flag = headers
        .get(header_names::STREAM)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    accepts_sse || stream_flag
}

pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(super) async fn inspect_phase(
    State(state): State<AppState>,
    Query(params): Query<LeagueParams>,
) -> Result<Json<PhaseInspection>, AppError> {
    let league_id = required(params.league_id, "league_id")?;
    Ok(Json(state.orchestrator.current_phase(&league_id).await?))
}

#[instrument(skip(state, headers, credentials, params))]
pub(super) async fn run_orchestration(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    headers: HeaderMap,
    Query(params): Query<RunParams>,
) -> Result<Response, AppError> {
    let request = OrchestrationRequest {
        league_id: required(params.league_id, "league_id")?,
        phase: params.phase,
        include_optional: flag(params.include_optional.as_deref(), "include_optional")?,
        dry_run: flag(params.dry_run.as_deref(), "dry_run")?,
        credentials,
    };

    if wants_stream(&headers) {
        // Request errors answer with their status before the stream opens
        state.orchestrator.validate(&request).await?;
        info!("Streaming orchestration for league {}", request.league_id);
        return Ok(stream_orchestration(state, request).into_response());
    }

    let outcome: Outcome = state.orchestrator.run(&request, &Progress::silent()).await?;
    Ok(Json(outcome).into_response())
}

/// Runs the orchestration on its own task and relays progress as SSE.
///
/// The task outlives the response: a client that disconnects does not cancel refresh
/// calls already dispatched.
fn stream_orchestration(state: AppState, request: OrchestrationRequest) -> impl IntoResponse {
    let (progress, receiver) = Progress::channel(PROGRESS_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        if let Err(e) = state.orchestrator.run(&request, &progress).await {
            let mut details = serde_json::json!({
                "status": e.status_code(),
                "error": e.to_string(),
            });
            if matches!(e, AppError::InvalidPhase { .. }) {
                details["valid_phases"] = serde_json::json!(crate::models::Phase::valid_names());
            }
            progress
                .emit(
                    ProgressEvent::new(ProgressKind::Error, e.to_string())
                        .with_details(details)
                        .finished(),
                )
                .await;
        }
    });

    let stream = ReceiverStream::new(receiver).map(|event| Event::default().json_data(&event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub(super) async fn retry_endpoint(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Query(params): Query<RetryParams>,
) -> Result<Json<RefreshResult>, AppError> {
    let league_id = required(params.league_id, "league_id")?;
    let endpoint = required(params.endpoint, "endpoint")?;
    let result = state
        .orchestrator
        .retry(&league_id, &endpoint, &credentials)
        .await?;
    Ok(Json(result))
}
