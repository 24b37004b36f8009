use super::FixtureStore;
use crate::error::AppError;
use crate::models::{Fixture, League};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process store for single-instance deployments and tests.
///
/// Fixtures are keyed by `(api_id, league_id)`, so writing the same fixture twice
/// updates it in place.
#[derive(Debug, Default)]
pub struct MemoryStore {
    leagues: RwLock<HashMap<String, League>>,
    fixtures: RwLock<HashMap<(i64, String), Fixture>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_league(&self, league: League) {
        self.leagues.write().await.insert(league.id.clone(), league);
    }

    pub async fn upsert_fixture(&self, fixture: Fixture) {
        let key = (fixture.api_id, fixture.league_id.clone());
        self.fixtures.write().await.insert(key, fixture);
    }

    pub async fn fixture_count(&self) -> usize {
        self.fixtures.read().await.len()
    }
}

#[async_trait]
impl FixtureStore for MemoryStore {
    async fn league(&self, league_id: &str) -> Result<Option<League>, AppError> {
        Ok(self.leagues.read().await.get(league_id).cloned())
    }

    async fn fixtures_between(
        &self,
        league_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Fixture>, AppError> {
        let mut fixtures: Vec<Fixture> = self
            .fixtures
            .read()
            .await
            .values()
            .filter(|f| f.league_id == league_id && f.date >= from && f.date <= to)
            .cloned()
            .collect();
        fixtures.sort_by_key(|f| f.date);
        Ok(fixtures)
    }
}
