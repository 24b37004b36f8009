use crate::models::{EndpointDescriptor, Fixture, FixtureStatus, League, RefreshResult};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

static NEXT_FIXTURE_ID: AtomicI64 = AtomicI64::new(1_000_000);

/// Test utilities for creating mock data and testing scenarios
pub struct TestDataBuilder;

impl TestDataBuilder {
    pub const LEAGUE_ID: &'static str = "7f1d2c9e-epl";

    /// Creates the league used across tests
    pub fn league() -> League {
        League {
            id: Self::LEAGUE_ID.to_string(),
            api_id: 39,
            name: "Premier League".to_string(),
            season: 2024,
        }
    }

    /// Creates a fixture for the test league with a fresh api id
    pub fn fixture_at(date: DateTime<Utc>, status: &str) -> Fixture {
        Fixture {
            api_id: NEXT_FIXTURE_ID.fetch_add(1, Ordering::Relaxed),
            league_id: Self::LEAGUE_ID.to_string(),
            date,
            status: FixtureStatus::from(status),
        }
    }

    /// Creates a successful refresh result
    pub fn ok_result(endpoint: &str, duration: u64) -> RefreshResult {
        RefreshResult::succeeded(&Self::endpoint(endpoint), duration, None)
    }

    /// Creates a failed refresh result
    pub fn failed_result(endpoint: &str, error: &str) -> RefreshResult {
        RefreshResult::failed(&Self::endpoint(endpoint), 0, error, None)
    }

    /// Parses an endpoint descriptor, panicking on invalid test input
    pub fn endpoint(raw: &str) -> EndpointDescriptor {
        raw.parse()
            .unwrap_or_else(|e| panic!("invalid test endpoint '{raw}': {e}"))
    }
}
