use std::path::{Path, PathBuf};

const APP_DIR: &str = "matchday_sync";

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join(APP_DIR)
}

/// Returns the platform-specific path for the config file
/// (e.g. `~/.config/matchday_sync/config.toml` on Linux).
///
/// Falls back to the current directory if the config directory is unavailable.
pub fn get_config_path() -> String {
    app_dir().join("config.toml").to_string_lossy().to_string()
}

/// Returns the platform-specific path for the log directory.
pub fn get_log_dir_path() -> String {
    app_dir().join("logs").to_string_lossy().to_string()
}
