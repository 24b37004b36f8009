use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Whether the process exits after a single command instead of serving.
pub fn is_oneshot_mode(args: &Args) -> bool {
    args.once
        || args.list_config
        || args.new_refresh_base_url.is_some()
        || args.new_store_url.is_some()
        || args.new_log_file_path.is_some()
        || args.clear_log_file_path
}

/// Match-phase driven refresh orchestrator
///
/// Detects where a league sits in its fixture cycle (pre-match, imminent, live,
/// post-match) and triggers the matching set of per-entity data refreshers.
///
/// By default the admin HTTP API is served:
/// - GET  /api/admin/phase-orchestrator?league_id=ID shows the detected phase
/// - POST /api/admin/phase-orchestrator?league_id=ID runs a refresh (SSE with Accept: text/event-stream)
/// - POST /api/admin/phase-orchestrator/retry?league_id=ID&endpoint=NAME retries one endpoint
///
/// With --once a single orchestration runs and its JSON summary is printed.
#[derive(Parser, Debug, Default)]
#[command(about, long_about = None, version)]
#[command(styles = get_styles())]
pub struct Args {
    /// Run a single orchestration for --league, print the JSON result and exit.
    #[arg(short, long, requires = "league")]
    pub once: bool,

    /// Internal league id to orchestrate.
    #[arg(long, help_heading = "Run Options")]
    pub league: Option<String>,

    /// Force a phase instead of detecting it (pre-match, imminent, live, post-match).
    #[arg(long, help_heading = "Run Options", requires = "once")]
    pub phase: Option<String>,

    /// Run the optional wave after the required one.
    #[arg(long = "include-optional", help_heading = "Run Options", requires = "once")]
    pub include_optional: bool,

    /// List the endpoints that would run without calling any of them.
    #[arg(long = "dry-run", help_heading = "Run Options", requires = "once")]
    pub dry_run: bool,

    /// Evaluate phase detection at this instant (RFC 3339) instead of now.
    #[arg(long = "at", value_name = "TIMESTAMP", help_heading = "Run Options", requires = "once")]
    pub at: Option<String>,

    /// Address to serve the admin API on, overriding the config file.
    #[arg(long, value_name = "HOST:PORT", help_heading = "Server Options")]
    pub bind: Option<String>,

    /// Update the refresher base URL in config.
    #[arg(long = "set-refresh-url", value_name = "URL", help_heading = "Configuration")]
    pub new_refresh_base_url: Option<String>,

    /// Update the store URL in config.
    #[arg(long = "set-store-url", value_name = "URL", help_heading = "Configuration")]
    pub new_store_url: Option<String>,

    /// Update log file path in config. This sets a persistent custom log file location.
    #[arg(long = "set-log-file", help_heading = "Configuration")]
    pub new_log_file_path: Option<String>,

    /// Clear the custom log file path from config. This reverts to using the default log location.
    #[arg(long = "clear-log-file", help_heading = "Configuration")]
    pub clear_log_file_path: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Also log to the terminal in --once mode and raise the log level to debug.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}
