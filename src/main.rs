mod app;
mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Args, is_oneshot_mode};
use matchday_sync::config::Config;
use matchday_sync::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    commands::validate_args(&args)?;

    // Config errors surface after logging is up; here only the log path matters
    let config_log_path = Config::load()
        .await
        .ok()
        .and_then(|config| config.log_file_path);
    let (log_file_path, guard) = logging::setup_logging(&args, config_log_path).await?;
    tracing::info!("Logs are being written to: {log_file_path}");

    if args.list_config {
        return commands::handle_list_config_command().await;
    }

    if is_oneshot_mode(&args) && !args.once {
        return commands::handle_config_update_command(&args).await;
    }

    let config = Config::load().await?;

    if args.once {
        let success = commands::handle_once_command(&args, &config).await?;
        if !success {
            // exit skips destructors, flush the log writer first
            drop(guard);
            std::process::exit(1);
        }
        return Ok(());
    }

    app::run_server(&config, args.bind.as_deref()).await
}
