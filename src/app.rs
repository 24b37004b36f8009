use matchday_sync::auth::{AdminGuard, AdminSessionTokens, InMemoryAttemptStore};
use matchday_sync::config::Config;
use matchday_sync::constants;
use matchday_sync::error::AppError;
use matchday_sync::http_client::create_http_client_with_timeout;
use matchday_sync::orchestrator::PhaseOrchestrator;
use matchday_sync::refresh::HttpRefreshExecutor;
use matchday_sync::server::{self, AppState};
use matchday_sync::store::RestStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Wires the store, executor and phase table from config into an orchestrator.
pub fn build_orchestrator(config: &Config) -> Result<PhaseOrchestrator, AppError> {
    let client = create_http_client_with_timeout(config.http_timeout_seconds)?;
    let store = RestStore::new(client.clone(), &config.store_url, &config.store_api_key);
    let executor = HttpRefreshExecutor::new(client, &config.refresh_base_url);
    Ok(PhaseOrchestrator::new(
        Arc::new(store),
        Arc::new(executor),
        config.phase_table()?,
    ))
}

pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let guard = AdminGuard::new(
        config.admin_api_key.clone(),
        Arc::new(AdminSessionTokens::new(config.admin_session_tokens.clone())),
        Arc::new(InMemoryAttemptStore::new(
            config.auth_max_attempts,
            Duration::from_secs(config.auth_window_seconds),
            constants::auth::TRACKED_CLIENTS,
        )),
    );
    Ok(AppState::new(build_orchestrator(config)?, guard))
}

/// Serves the admin API until shutdown.
pub async fn run_server(config: &Config, bind_override: Option<&str>) -> Result<(), AppError> {
    let bind_address = bind_override.unwrap_or(&config.bind_address);
    if config.admin_api_key.is_none() && config.admin_session_tokens.is_empty() {
        info!("No admin API key or session tokens configured; every admin request will be rejected");
    }
    server::serve(bind_address, build_state(config)?).await
}
