use crate::app::build_orchestrator;
use crate::cli::Args;
use chrono::{DateTime, Utc};
use matchday_sync::config::Config;
use matchday_sync::error::AppError;
use matchday_sync::orchestrator::{OrchestrationRequest, Outcome, Progress};
use matchday_sync::refresh::Credentials;

/// Parses the `--at` override into an instant.
pub fn parse_at(at: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    at.map(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AppError::datetime_parse_error(format!("Invalid --at '{raw}': {e}")))
    })
    .transpose()
}

/// Validates command line argument values clap cannot check on its own.
pub fn validate_args(args: &Args) -> Result<(), AppError> {
    parse_at(args.at.as_deref())?;
    if let Some(phase) = &args.phase {
        phase.parse::<matchday_sync::models::Phase>()?;
    }
    Ok(())
}

pub async fn handle_list_config_command() -> Result<(), AppError> {
    Config::display().await
}

/// Handles configuration update commands (--set-refresh-url, --set-store-url,
/// --set-log-file, --clear-log-file).
pub async fn handle_config_update_command(args: &Args) -> Result<(), AppError> {
    update_config_file(args, &Config::get_config_path()).await?;
    println!("Config updated successfully!");
    Ok(())
}

/// Applies the update flags to the config file at `config_path`. A malformed file is
/// reported and left untouched.
async fn update_config_file(args: &Args, config_path: &str) -> Result<(), AppError> {
    let mut config = Config::load_or_default(config_path).await?;

    if let Some(url) = &args.new_refresh_base_url {
        config.refresh_base_url = url.clone();
    }
    if let Some(url) = &args.new_store_url {
        config.store_url = url.clone();
    }
    if let Some(new_log_path) = &args.new_log_file_path {
        config.log_file_path = Some(new_log_path.clone());
    } else if args.clear_log_file_path {
        config.log_file_path = None;
        println!("Custom log file path cleared. Using default location.");
    }

    config.save_to_path(config_path).await
}

/// Runs one orchestration and prints its JSON result.
///
/// Returns whether every refresh succeeded; dry runs always count as success.
pub async fn handle_once_command(args: &Args, config: &Config) -> Result<bool, AppError> {
    let league_id = args
        .league
        .clone()
        .ok_or_else(|| AppError::missing_parameter("league"))?;
    let orchestrator = build_orchestrator(config)?;

    let request = OrchestrationRequest {
        league_id,
        phase: args.phase.clone(),
        include_optional: args.include_optional,
        dry_run: args.dry_run,
        credentials: config
            .admin_api_key
            .clone()
            .map(Credentials::ApiKey)
            .unwrap_or_default(),
    };
    let now = parse_at(args.at.as_deref())?.unwrap_or_else(Utc::now);

    let outcome = orchestrator
        .run_at(&request, now, &Progress::silent())
        .await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(match outcome {
        Outcome::Run(summary) => summary.success,
        Outcome::DryRun(_) => true,
    })
}
