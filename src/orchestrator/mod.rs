//! Match-phase driven refresh orchestration.
//!
//! A run resolves the league, picks a phase (explicit override or detection over the
//! fixture window), looks up that phase's endpoints and fans them out in two waves:
//! every required endpoint concurrently, then, when requested, every optional one.

pub mod progress;

pub use progress::{PROGRESS_CHANNEL_CAPACITY, Progress, ProgressEvent, ProgressKind};

use crate::error::AppError;
use crate::models::{
    DryRunReport, EndpointDescriptor, League, Phase, PhaseInspection, RefreshResult, RunSummary,
};
use crate::phase::{PhaseTable, detect_phase, detect_sub_state, window_bounds};
use crate::refresh::{Credentials, RefreshExecutor};
use crate::store::FixtureStore;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Parameters of one orchestration run.
#[derive(Debug, Clone, Default)]
pub struct OrchestrationRequest {
    pub league_id: String,
    /// Explicit phase override; detection runs when absent or blank.
    pub phase: Option<String>,
    pub include_optional: bool,
    pub dry_run: bool,
    pub credentials: Credentials,
}

impl OrchestrationRequest {
    pub fn new(league_id: impl Into<String>) -> Self {
        Self {
            league_id: league_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Run(RunSummary),
    DryRun(DryRunReport),
}

impl Outcome {
    pub fn phase(&self) -> Phase {
        match self {
            Outcome::Run(summary) => summary.phase,
            Outcome::DryRun(report) => report.phase,
        }
    }
}

pub struct PhaseOrchestrator {
    store: Arc<dyn FixtureStore>,
    executor: Arc<dyn RefreshExecutor>,
    table: PhaseTable,
}

impl PhaseOrchestrator {
    pub fn new(
        store: Arc<dyn FixtureStore>,
        executor: Arc<dyn RefreshExecutor>,
        table: PhaseTable,
    ) -> Self {
        Self {
            store,
            executor,
            table,
        }
    }

    /// Rejects what a run would reject before dispatching anything: an unknown league
    /// or an unparseable phase override.
    pub async fn validate(&self, request: &OrchestrationRequest) -> Result<(), AppError> {
        self.load_league(&request.league_id).await?;
        parse_override(request.phase.as_deref())?;
        Ok(())
    }

    pub async fn run(
        &self,
        request: &OrchestrationRequest,
        progress: &Progress,
    ) -> Result<Outcome, AppError> {
        self.run_at(request, Utc::now(), progress).await
    }

    /// Runs one orchestration with detection evaluated at `now`.
    #[instrument(skip(self, request, progress), fields(league = %request.league_id))]
    pub async fn run_at(
        &self,
        request: &OrchestrationRequest,
        now: DateTime<Utc>,
        progress: &Progress,
    ) -> Result<Outcome, AppError> {
        let league = self.load_league(&request.league_id).await?;
        let phase = self
            .resolve_phase(&league, request.phase.as_deref(), now)
            .await?;
        let endpoints = self.table.get(phase);

        progress
            .emit(
                ProgressEvent::new(
                    ProgressKind::Info,
                    format!("Phase resolved for {}: {}", league.name, phase),
                )
                .with_details(serde_json::json!({
                    "phase": phase,
                    "required": endpoints.required,
                    "optional": endpoints.optional,
                    "include_optional": request.include_optional,
                })),
            )
            .await;

        if request.dry_run {
            let report = DryRunReport {
                success: true,
                dry_run: true,
                league,
                phase,
                include_optional: request.include_optional,
                endpoints: endpoints.selection(request.include_optional),
                required: endpoints.required.clone(),
                optional: endpoints.optional.clone(),
            };
            info!(
                "Dry run for {} ({}): {} endpoints",
                report.league.name,
                phase,
                report.endpoints.len()
            );
            progress
                .emit(
                    ProgressEvent::new(
                        ProgressKind::Summary,
                        format!("Dry run: {} endpoints would refresh", report.endpoints.len()),
                    )
                    .with_details(serde_json::to_value(&report)?)
                    .finished(),
                )
                .await;
            return Ok(Outcome::DryRun(report));
        }

        if request.include_optional && endpoints.optional.is_empty() {
            progress
                .emit(ProgressEvent::new(
                    ProgressKind::Warning,
                    format!("Phase {phase} defines no optional endpoints, skipping optional wave"),
                ))
                .await;
        }

        let started = Instant::now();
        let mut results = self
            .run_wave("required", &endpoints.required, &league, request, progress)
            .await;
        if request.include_optional && !endpoints.optional.is_empty() {
            results.extend(
                self.run_wave("optional", &endpoints.optional, &league, request, progress)
                    .await,
            );
        }
        let duration = started.elapsed().as_millis() as u64;

        let summary = RunSummary::from_results(league, phase, results, duration);
        if summary.success {
            info!(
                "Phase {} refresh for {} completed: {}/{} in {}ms",
                phase,
                summary.league.name,
                summary.summary.successful,
                summary.summary.total,
                duration
            );
        } else {
            warn!(
                "Phase {} refresh for {} finished with {} failures out of {}",
                phase, summary.league.name, summary.summary.failed, summary.summary.total
            );
        }

        progress
            .emit(
                ProgressEvent::new(
                    ProgressKind::Summary,
                    format!(
                        "Completed {}/{} endpoints in {}ms",
                        summary.summary.successful, summary.summary.total, duration
                    ),
                )
                .with_details(serde_json::to_value(&summary)?)
                .finished(),
            )
            .await;

        Ok(Outcome::Run(summary))
    }

    /// Detected phase and the full table, without touching any refresher.
    pub async fn current_phase(&self, league_id: &str) -> Result<PhaseInspection, AppError> {
        self.current_phase_at(league_id, Utc::now()).await
    }

    pub async fn current_phase_at(
        &self,
        league_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PhaseInspection, AppError> {
        let league = self.load_league(league_id).await?;
        let (from, to) = window_bounds(now);
        let fixtures = self.store.fixtures_between(&league.id, from, to).await?;
        let sub_state = detect_sub_state(&fixtures, now);

        Ok(PhaseInspection {
            current_phase: detect_phase(&fixtures, now),
            sub_state,
            fixtures_in_window: crate::phase::fixtures_in_window(&fixtures, now).len(),
            phases: self.table.view(),
            league,
        })
    }

    /// Re-invokes exactly one endpoint for a league.
    #[instrument(skip(self, credentials))]
    pub async fn retry(
        &self,
        league_id: &str,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<RefreshResult, AppError> {
        let endpoint: EndpointDescriptor = endpoint.parse()?;
        let league = self.load_league(league_id).await?;
        info!("Manual retry of {} for {}", endpoint, league.name);
        Ok(self.executor.execute(&endpoint, &league, credentials).await)
    }

    async fn load_league(&self, league_id: &str) -> Result<League, AppError> {
        self.store
            .league(league_id)
            .await?
            .ok_or_else(|| AppError::league_not_found(league_id))
    }

    async fn resolve_phase(
        &self,
        league: &League,
        requested: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Phase, AppError> {
        if let Some(phase) = parse_override(requested)? {
            info!("Using phase override {} for {}", phase, league.name);
            return Ok(phase);
        }

        let (from, to) = window_bounds(now);
        let fixtures = self.store.fixtures_between(&league.id, from, to).await?;
        let phase = detect_phase(&fixtures, now);
        info!(
            "Detected phase {} for {} from {} fixtures",
            phase,
            league.name,
            fixtures.len()
        );
        Ok(phase)
    }

    /// Dispatches every endpoint of one wave concurrently and waits for all of them.
    async fn run_wave(
        &self,
        wave: &str,
        endpoints: &[EndpointDescriptor],
        league: &League,
        request: &OrchestrationRequest,
        progress: &Progress,
    ) -> Vec<RefreshResult> {
        progress
            .emit(ProgressEvent::new(
                ProgressKind::Info,
                format!("Starting {wave} wave: {} endpoints", endpoints.len()),
            ))
            .await;

        let calls = endpoints.iter().map(|endpoint| async move {
            let result = self
                .executor
                .execute(endpoint, league, &request.credentials)
                .await;
            let event = if result.success {
                ProgressEvent::new(
                    ProgressKind::Success,
                    format!("{} refreshed in {}ms", result.endpoint, result.duration),
                )
            } else {
                ProgressEvent::new(
                    ProgressKind::Error,
                    format!(
                        "{} failed: {}",
                        result.endpoint,
                        result.error.as_deref().unwrap_or("Unknown error")
                    ),
                )
            };
            progress
                .emit(event.with_details(serde_json::json!({
                    "endpoint": result.endpoint,
                    "wave": wave,
                    "duration": result.duration,
                })))
                .await;
            result
        });

        join_all(calls).await
    }
}

/// A blank override means "detect".
fn parse_override(requested: Option<&str>) -> Result<Option<Phase>, AppError> {
    requested
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::parse)
        .transpose()
}
