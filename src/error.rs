use thiserror::Error;

use crate::models::Phase;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Upstream request failed: {0}")]
    ApiFetch(#[from] reqwest::Error),

    #[error("Invalid JSON payload: {0}")]
    ApiParse(#[from] serde_json::Error),

    // Upstream (store and refresher) responses
    #[error("Upstream resource not found: {url}")]
    ApiNotFound { url: String },

    #[error("Upstream {status} from {url}: {message}")]
    ApiServerError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("Upstream rejected request with {status} at {url}: {message}")]
    ApiClientError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("Upstream rate limited {url}: {message}")]
    ApiRateLimit { message: String, url: String },

    #[error("Upstream timeout: {url}")]
    NetworkTimeout { url: String },

    #[error("Could not connect to {url}: {message}")]
    NetworkConnection { url: String, message: String },

    #[error("Malformed response from {url}: {message}")]
    ApiMalformedJson { message: String, url: String },

    #[error("Unexpected response shape from {url}: {message}")]
    ApiUnexpectedStructure { message: String, url: String },

    // Admin request errors
    #[error("Invalid phase '{value}'. Valid phases: {}", Phase::valid_names().join(", "))]
    InvalidPhase { value: String },

    #[error("Invalid endpoint descriptor: {value}")]
    InvalidEndpoint { value: String },

    #[error("Missing required parameter: {name}")]
    MissingParameter { name: String },

    #[error("Invalid value '{value}' for parameter {name}")]
    InvalidParameter { name: String, value: String },

    #[error("League not found: {league_id}")]
    LeagueNotFound { league_id: String },

    #[error("Admin access required")]
    Unauthorized,

    #[error("Too many failed attempts, retry in {retry_after_seconds}s")]
    TooManyAttempts { retry_after_seconds: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not write config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Could not read config: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid timestamp: {0}")]
    DateTimeParse(String),

    #[error("Logging could not be initialised: {0}")]
    LogSetup(String),
}

impl AppError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn datetime_parse_error(msg: impl Into<String>) -> Self {
        Self::DateTimeParse(msg.into())
    }

    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }

    /// Store row or refresher route missing upstream
    pub fn api_not_found(url: impl Into<String>) -> Self {
        Self::ApiNotFound { url: url.into() }
    }

    /// 5xx from a store or refresher
    pub fn api_server_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiServerError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// 4xx other than 404 and 429
    pub fn api_client_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiClientError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    pub fn api_rate_limit(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiRateLimit {
            message: message.into(),
            url: url.into(),
        }
    }

    pub fn network_timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    pub fn network_connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkConnection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Empty or non-JSON body where JSON was expected
    pub fn api_malformed_json(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiMalformedJson {
            message: message.into(),
            url: url.into(),
        }
    }

    pub fn api_unexpected_structure(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiUnexpectedStructure {
            message: message.into(),
            url: url.into(),
        }
    }

    pub fn invalid_phase(value: impl Into<String>) -> Self {
        Self::InvalidPhase {
            value: value.into(),
        }
    }

    pub fn invalid_endpoint(value: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            value: value.into(),
        }
    }

    pub fn league_not_found(league_id: impl Into<String>) -> Self {
        Self::LeagueNotFound {
            league_id: league_id.into(),
        }
    }

    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    pub fn invalid_parameter(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Transient upstream failures an operator may retry by hand.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::NetworkTimeout { .. }
                | AppError::NetworkConnection { .. }
                | AppError::ApiServerError { .. }
                | AppError::ApiRateLimit { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::ApiNotFound { .. } | AppError::LeagueNotFound { .. }
        )
    }

    /// HTTP status code the admin API answers with when this error escapes a handler.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidPhase { .. }
            | AppError::InvalidEndpoint { .. }
            | AppError::MissingParameter { .. }
            | AppError::InvalidParameter { .. } => 400,
            AppError::Unauthorized => 403,
            AppError::LeagueNotFound { .. } => 404,
            AppError::TooManyAttempts { .. } => 429,
            AppError::ApiFetch(_)
            | AppError::ApiParse(_)
            | AppError::ApiNotFound { .. }
            | AppError::ApiServerError { .. }
            | AppError::ApiClientError { .. }
            | AppError::ApiRateLimit { .. }
            | AppError::NetworkTimeout { .. }
            | AppError::NetworkConnection { .. }
            | AppError::ApiMalformedJson { .. }
            | AppError::ApiUnexpectedStructure { .. } => 502,
            AppError::Io(_)
            | AppError::TomlSerialize(_)
            | AppError::TomlDeserialize(_)
            | AppError::Config(_)
            | AppError::DateTimeParse(_)
            | AppError::LogSetup(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_helper() {
        let error = AppError::config_error("Invalid configuration");
        assert!(matches!(error, AppError::Config(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration"
        );
    }

    #[test]
    fn test_api_server_error_helper() {
        let error =
            AppError::api_server_error(500, "Internal server error", "https://store.example.com");
        assert!(matches!(error, AppError::ApiServerError { .. }));
        assert_eq!(
            error.to_string(),
            "Upstream 500 from https://store.example.com: Internal server error"
        );
    }

    #[test]
    fn test_network_timeout_helper() {
        let error = AppError::network_timeout("https://refresh.example.com/standings");
        assert_eq!(
            error.to_string(),
            "Upstream timeout: https://refresh.example.com/standings"
        );
        assert_eq!(error.status_code(), 502);
    }

    #[test]
    fn test_invalid_phase_lists_valid_phases() {
        let error = AppError::invalid_phase("halftime");
        assert_eq!(
            error.to_string(),
            "Invalid phase 'halftime'. Valid phases: pre-match, imminent, live, post-match"
        );
        assert_eq!(error.status_code(), 400);
    }

    #[test]
    fn test_league_not_found_helper() {
        let error = AppError::league_not_found("epl-2024");
        assert_eq!(error.to_string(), "League not found: epl-2024");
        assert!(error.is_not_found());
        assert_eq!(error.status_code(), 404);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Unauthorized.status_code(), 403);
        assert_eq!(
            AppError::TooManyAttempts {
                retry_after_seconds: 30
            }
            .status_code(),
            429
        );
        assert_eq!(AppError::invalid_endpoint("?").status_code(), 400);
        assert_eq!(
            AppError::invalid_parameter("dry_run", "maybe").status_code(),
            400
        );
        assert_eq!(AppError::network_timeout("url").status_code(), 502);
        assert_eq!(AppError::config_error("bad").status_code(), 500);
    }

    #[test]
    fn test_is_retryable() {
        assert!(AppError::network_timeout("url").is_retryable());
        assert!(AppError::network_connection("url", "message").is_retryable());
        assert!(AppError::api_server_error(500, "message", "url").is_retryable());
        assert!(AppError::api_rate_limit("message", "url").is_retryable());

        assert!(!AppError::api_not_found("url").is_retryable());
        assert!(!AppError::api_client_error(400, "message", "url").is_retryable());
        assert!(!AppError::invalid_phase("x").is_retryable());
        assert!(!AppError::api_malformed_json("message", "url").is_retryable());
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_error: AppError = json_error.into();
        assert!(matches!(app_error, AppError::ApiParse(_)));
    }

    #[test]
    fn test_error_from_toml_deserialize() {
        let toml_error = toml::from_str::<serde_json::Value>("invalid = [toml").unwrap_err();
        let app_error: AppError = toml_error.into();
        assert!(matches!(app_error, AppError::TomlDeserialize(_)));
    }

    #[test]
    fn test_error_display_formats() {
        let errors = vec![
            AppError::config_error("test config error"),
            AppError::datetime_parse_error("test datetime error"),
            AppError::log_setup_error("test log error"),
            AppError::api_not_found("https://example.com"),
            AppError::api_client_error(400, "client error", "https://example.com"),
            AppError::network_connection("https://example.com", "connection failed"),
            AppError::api_unexpected_structure("bad structure", "https://example.com"),
            AppError::invalid_endpoint("?mode=live"),
            AppError::Unauthorized,
        ];

        for error in errors {
            let display_string = error.to_string();
            assert!(
                display_string.len() > 5,
                "Error display should be descriptive: {error:?}"
            );
        }
    }
}
