use super::Config;
use crate::error::AppError;
use std::net::SocketAddr;
use std::path::Path;

fn validate_url(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::config_error(format!("{field} cannot be empty")));
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(AppError::config_error(format!(
            "{field} must start with http:// or https://, got '{value}'"
        )));
    }
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|e| AppError::config_error(format!("{field} is not a valid URL: {e}")))
}

/// Validates the configuration settings
///
/// # Validation Rules
/// - Refresh base URL and store URL must be absolute http(s) URLs
/// - Bind address must be a socket address (`host:port`)
/// - HTTP timeout and failed-attempt limits must be positive
/// - If log file path is provided, it cannot be empty
/// - Log file path parent directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    validate_url("refresh_base_url", &config.refresh_base_url)?;
    validate_url("store_url", &config.store_url)?;

    config.bind_address.parse::<SocketAddr>().map_err(|e| {
        AppError::config_error(format!(
            "bind_address '{}' is not a valid socket address: {e}",
            config.bind_address
        ))
    })?;

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "http_timeout_seconds must be greater than zero",
        ));
    }
    if config.auth_max_attempts == 0 || config.auth_window_seconds == 0 {
        return Err(AppError::config_error(
            "auth_max_attempts and auth_window_seconds must be greater than zero",
        ));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            refresh_base_url: "http://localhost:3000/api/admin/refresh".to_string(),
            store_url: "https://db.example.com".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_missing_urls() {
        let err = validate_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("refresh_base_url cannot be empty"));

        let config = Config {
            store_url: "db.example.com".to_string(),
            ..valid()
        };
        assert!(validate_config(&config).unwrap_err().to_string().contains("store_url"));
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = Config {
            bind_address: "localhost".to_string(),
            ..valid()
        };
        assert!(matches!(validate_config(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = Config {
            http_timeout_seconds: 0,
            ..valid()
        };
        assert!(validate_config(&config).is_err());

        let config = Config {
            auth_max_attempts: 0,
            ..valid()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_log_path_directory_is_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("nested").join("sync.log");
        let config = Config {
            log_file_path: Some(log_path.to_string_lossy().to_string()),
            ..valid()
        };
        assert!(validate_config(&config).is_ok());
        assert!(temp_dir.path().join("nested").exists());

        let config = Config {
            log_file_path: Some(String::new()),
            ..valid()
        };
        assert!(validate_config(&config).is_err());
    }
}
