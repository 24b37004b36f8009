//! Application-wide constants and configuration values
//!
//! This module centralizes all magic numbers and configuration constants
//! to improve maintainability and make the codebase more configurable.

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 120;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 32;

/// Default address the admin API listens on
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// Phase detection windows
pub mod detection {
    /// Fixtures kicking off further back than this are ignored
    pub const WINDOW_PAST_DAYS: i64 = 3;

    /// Fixtures kicking off further ahead than this are ignored
    pub const WINDOW_FUTURE_DAYS: i64 = 7;

    /// An upcoming kickoff closer than this makes the league imminent
    pub const IMMINENT_THRESHOLD_HOURS: i64 = 3;
}

/// Header and cookie names used by the admin API
pub mod headers {
    /// Shared admin secret, accepted by the orchestrator and forwarded to refreshers
    pub const ADMIN_API_KEY: &str = "x-admin-api-key";

    /// Opt-in for server-sent events when `Accept` cannot be set
    pub const STREAM: &str = "x-stream";

    /// Session cookie issued by the dashboard login
    pub const SESSION_COOKIE: &str = "admin_session";
}

/// Failed admin authentication throttling
pub mod auth {
    /// Failed attempts allowed per client within one window
    pub const MAX_ATTEMPTS: u32 = 5;

    /// Window length in seconds
    pub const WINDOW_SECONDS: u64 = 900;

    /// Number of distinct clients tracked at once
    pub const TRACKED_CLIENTS: usize = 1024;
}

/// Environment variable names
pub mod env_vars {
    pub const BIND_ADDRESS: &str = "MATCHDAY_BIND_ADDRESS";
    pub const REFRESH_BASE_URL: &str = "MATCHDAY_REFRESH_BASE_URL";
    pub const STORE_URL: &str = "MATCHDAY_STORE_URL";
    pub const STORE_API_KEY: &str = "MATCHDAY_STORE_API_KEY";
    pub const ADMIN_API_KEY: &str = "MATCHDAY_ADMIN_API_KEY";
    pub const LOG_FILE: &str = "MATCHDAY_LOG_FILE";
    pub const HTTP_TIMEOUT: &str = "MATCHDAY_HTTP_TIMEOUT";
}
