//! Read access to the relational store the per-entity refreshers write into.

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use crate::error::AppError;
use crate::models::{Fixture, League};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// What the orchestrator needs from the store: the league context and the
/// fixtures it classifies. Writes belong to the refreshers.
#[async_trait]
pub trait FixtureStore: Send + Sync {
    async fn league(&self, league_id: &str) -> Result<Option<League>, AppError>;

    /// Fixtures of one league with kickoff in `[from, to]`, ordered by kickoff.
    async fn fixtures_between(
        &self,
        league_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Fixture>, AppError>;
}
