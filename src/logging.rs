use crate::cli::Args;
use matchday_sync::config::Config;
use matchday_sync::error::AppError;
use std::io::stdout;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILE_NAME: &str = "matchday_sync.log";

fn env_filter(debug: bool) -> Result<EnvFilter, AppError> {
    let directive = if debug {
        "matchday_sync=debug"
    } else {
        "matchday_sync=info"
    };
    let directive = directive
        .parse()
        .map_err(|e| AppError::log_setup_error(format!("Invalid log directive: {e}")))?;
    Ok(EnvFilter::from_default_env()
        .add_directive(directive)
        .add_directive(
            "tower_http=info"
                .parse()
                .map_err(|e| AppError::log_setup_error(format!("Invalid log directive: {e}")))?,
        ))
}

/// Sets up logging configuration for the application.
///
/// - Serving and config commands: logs to both stdout and file
/// - Once mode without debug: logs only to file, so stdout carries just the JSON result
/// - Uses a daily rolling file appender, creating the log directory if needed
///
/// Returns the path to the log file and the guard that must be kept alive
/// for the duration of the program to ensure proper log flushing.
pub async fn setup_logging(
    args: &Args,
    config_log_path: Option<String>,
) -> Result<(String, WorkerGuard), AppError> {
    let custom_log_path = args.log_file.clone().or(config_log_path);
    let (log_dir, log_file_name) = match custom_log_path {
        Some(custom_path) => {
            let path = Path::new(&custom_path);
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_LOG_FILE_NAME);
            (parent.to_string_lossy().to_string(), file_name.to_string())
        }
        None => (Config::get_log_dir_path(), DEFAULT_LOG_FILE_NAME.to_string()),
    };

    if !Path::new(&log_dir).exists() {
        tokio::fs::create_dir_all(&log_dir).await.map_err(|e| {
            AppError::log_setup_error(format!("Failed to create log directory: {e}"))
        })?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, &log_file_name);

    // The guard must outlive every log call or buffered lines are lost
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = if args.once && !args.debug {
        None
    } else {
        Some(
            fmt::Layer::new()
                .with_writer(stdout)
                .with_ansi(true)
                .with_filter(env_filter(args.debug)?),
        )
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(env_filter(args.debug)?),
        )
        .try_init()
        .map_err(|e| AppError::log_setup_error(format!("Failed to install subscriber: {e}")))?;

    let log_file_path = format!("{log_dir}/{log_file_name}");
    Ok((log_file_path, guard))
}
