//! Invocation of the per-entity refreshers.

pub mod executor;
pub mod urls;

pub use executor::HttpRefreshExecutor;
pub use urls::build_refresh_url;

use crate::models::{EndpointDescriptor, League, RefreshResult};
use async_trait::async_trait;

/// Authentication presented by the caller, forwarded unchanged to each refresher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    None,
    /// Shared admin secret, sent as the admin API key header.
    ApiKey(String),
    /// Raw `Cookie` header value carrying the admin session.
    SessionCookie(String),
}

/// Runs one refresh operation for one league.
///
/// Implementations never fail: transport and downstream errors come back as a
/// failed [`RefreshResult`] so sibling calls in the same wave are unaffected.
#[async_trait]
pub trait RefreshExecutor: Send + Sync {
    async fn execute(
        &self,
        endpoint: &EndpointDescriptor,
        league: &League,
        credentials: &Credentials,
    ) -> RefreshResult;
}
