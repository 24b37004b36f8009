use super::{EndpointDescriptor, League, Phase, SubState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Outcome of invoking one refresh operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResult {
    pub endpoint: String,
    pub success: bool,
    /// Wall clock in milliseconds from dispatch to completion.
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RefreshResult {
    pub fn succeeded(endpoint: &EndpointDescriptor, duration: u64, data: Option<Value>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            success: true,
            duration,
            error: None,
            data,
        }
    }

    pub fn failed(
        endpoint: &EndpointDescriptor,
        duration: u64,
        error: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            success: false,
            duration,
            error: Some(error.into()),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Milliseconds from the first dispatch to the last completion.
    pub duration: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedEndpoint {
    pub endpoint: String,
    pub error: String,
}

/// Aggregated report of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub success: bool,
    pub league: League,
    pub phase: Phase,
    pub summary: SummaryCounts,
    pub results: Vec<RefreshResult>,
    pub refreshed: Vec<String>,
    pub failed: Vec<FailedEndpoint>,
}

impl RunSummary {
    /// Builds the summary; counts and convenience lists are derived from `results`
    /// so they always agree with it.
    pub fn from_results(
        league: League,
        phase: Phase,
        results: Vec<RefreshResult>,
        duration: u64,
    ) -> Self {
        let refreshed: Vec<String> = results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.endpoint.clone())
            .collect();
        let failed: Vec<FailedEndpoint> = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| FailedEndpoint {
                endpoint: r.endpoint.clone(),
                error: r
                    .error
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            })
            .collect();

        Self {
            success: failed.is_empty(),
            league,
            phase,
            summary: SummaryCounts {
                total: results.len(),
                successful: refreshed.len(),
                failed: failed.len(),
                duration,
            },
            results,
            refreshed,
            failed,
        }
    }
}

/// What a run would execute, without executing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryRunReport {
    pub success: bool,
    pub dry_run: bool,
    pub league: League,
    pub phase: Phase,
    pub include_optional: bool,
    pub endpoints: Vec<EndpointDescriptor>,
    pub required: Vec<EndpointDescriptor>,
    pub optional: Vec<EndpointDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEndpointsView {
    pub required: Vec<EndpointDescriptor>,
    pub optional: Vec<EndpointDescriptor>,
}

/// Side-effect free view of the detected phase and the phase table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInspection {
    pub league: League,
    pub current_phase: Phase,
    pub sub_state: Option<SubState>,
    pub fixtures_in_window: usize,
    pub phases: BTreeMap<String, PhaseEndpointsView>,
}
