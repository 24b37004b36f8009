use crate::constants::{self, env_vars};
use crate::error::AppError;
use crate::phase::{PhaseEndpoints, PhaseTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_log_dir_path};
use validation::validate_config;

/// Configuration for the orchestrator service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Address the admin HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Base URL of the per-entity refreshers, e.g. `https://sync.example.com/api/admin/refresh`.
    #[serde(default)]
    pub refresh_base_url: String,
    /// Base URL of the PostgREST store.
    #[serde(default)]
    pub store_url: String,
    #[serde(default)]
    pub store_api_key: String,
    /// Shared admin secret accepted in the admin API key header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_api_key: Option<String>,
    /// Session cookie values trusted as admin sessions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admin_session_tokens: Vec<String>,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for store and refresh calls.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    #[serde(default = "default_auth_max_attempts")]
    pub auth_max_attempts: u32,
    #[serde(default = "default_auth_window")]
    pub auth_window_seconds: u64,
    /// Replacement phase table keyed by phase name; the built-in table is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<BTreeMap<String, PhaseEndpoints>>,
}

fn default_bind_address() -> String {
    constants::DEFAULT_BIND_ADDRESS.to_string()
}

/// Default HTTP timeout in seconds
fn default_http_timeout() -> u64 {
    constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_auth_max_attempts() -> u32 {
    constants::auth::MAX_ATTEMPTS
}

fn default_auth_window() -> u64 {
    constants::auth::WINDOW_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_address: default_bind_address(),
            refresh_base_url: String::new(),
            store_url: String::new(),
            store_api_key: String::new(),
            admin_api_key: None,
            admin_session_tokens: Vec::new(),
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
            auth_max_attempts: default_auth_max_attempts(),
            auth_window_seconds: default_auth_window(),
            phases: None,
        }
    }
}

/// Masks a secret for display, keeping only its first characters.
fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

impl Config {
    /// Loads configuration from the default config file location, falling back to
    /// defaults when no file exists. Environment variables override file values.
    ///
    /// # Environment Variables
    /// - `MATCHDAY_BIND_ADDRESS` - Override bind address
    /// - `MATCHDAY_REFRESH_BASE_URL` - Override refresher base URL
    /// - `MATCHDAY_STORE_URL` / `MATCHDAY_STORE_API_KEY` - Override store access
    /// - `MATCHDAY_ADMIN_API_KEY` - Override admin API key
    /// - `MATCHDAY_LOG_FILE` - Override log file path
    /// - `MATCHDAY_HTTP_TIMEOUT` - Override HTTP timeout in seconds
    pub async fn load() -> Result<Self, AppError> {
        let config_path = get_config_path();

        let mut config = Self::load_or_default(&config_path).await?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Applies `MATCHDAY_*` environment overrides on top of the current values.
    pub fn apply_env_overrides(&mut self) {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(bind_address) = var(env_vars::BIND_ADDRESS) {
            self.bind_address = bind_address;
        }
        if let Some(url) = var(env_vars::REFRESH_BASE_URL) {
            self.refresh_base_url = url;
        }
        if let Some(url) = var(env_vars::STORE_URL) {
            self.store_url = url;
        }
        if let Some(key) = var(env_vars::STORE_API_KEY) {
            self.store_api_key = key;
        }
        if let Some(key) = var(env_vars::ADMIN_API_KEY) {
            self.admin_api_key = Some(key);
        }
        if let Some(log_file_path) = var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }
        if let Some(timeout) = var(env_vars::HTTP_TIMEOUT).and_then(|s| s.parse::<u64>().ok()) {
            self.http_timeout_seconds = timeout;
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)?;
        self.phase_table().map(|_| ())
    }

    /// The configured phase table, or the built-in one.
    pub fn phase_table(&self) -> Result<PhaseTable, AppError> {
        match &self.phases {
            Some(entries) => PhaseTable::from_named(entries.clone()),
            None => Ok(PhaseTable::default()),
        }
    }

    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Label/value pairs for `--list-config`, secrets masked.
    pub fn summary_lines(&self, log_dir: &str) -> Vec<(&'static str, String)> {
        let phases = if self.phases.is_some() {
            "custom"
        } else {
            "built-in"
        };
        vec![
            ("bind", self.bind_address.clone()),
            ("refreshers", self.refresh_base_url.clone()),
            (
                "store",
                format!("{} (key {})", self.store_url, mask(&self.store_api_key)),
            ),
            (
                "admin key",
                mask(self.admin_api_key.as_deref().unwrap_or_default()),
            ),
            ("sessions", self.admin_session_tokens.len().to_string()),
            (
                "lockout",
                format!(
                    "{} failures / {}s",
                    self.auth_max_attempts, self.auth_window_seconds
                ),
            ),
            ("http timeout", format!("{}s", self.http_timeout_seconds)),
            ("phase table", phases.to_string()),
            (
                "log file",
                self.log_file_path
                    .clone()
                    .unwrap_or_else(|| format!("{log_dir}/matchday_sync.log")),
            ),
        ]
    }

    /// Displays current configuration settings to stdout, with secrets masked.
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            println!("(no file at {config_path}, showing defaults)");
            Config::default()
        };
        config.apply_env_overrides();

        println!("matchday_sync configuration ({config_path})");
        let log_dir = get_log_dir_path();
        for (label, value) in config.summary_lines(&log_dir) {
            println!("  {label:<16} {value}");
        }

        Ok(())
    }

    /// Saves configuration to a custom file path, creating the parent directory if needed.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let mut normalized = self.clone();
        normalized.refresh_base_url = self.refresh_base_url.trim_end_matches('/').to_string();
        normalized.store_url = self.store_url.trim_end_matches('/').to_string();

        let content = toml::to_string_pretty(&normalized)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path without environment overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`Config::load_from_path`], but a missing file yields the defaults.
    /// An unreadable or malformed file is still an error.
    pub async fn load_or_default(path: &str) -> Result<Self, AppError> {
        if Path::new(path).exists() {
            Self::load_from_path(path).await
        } else {
            Ok(Config::default())
        }
    }
}
