//! Global configuration loader for Roundtable.
//!
//! Reads `config.toml` from the data directory (`~/.roundtable/` in
//! production) and deserializes it into [`GlobalConfig`]. Falls back to
//! sensible defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use roundtable_types::config::GlobalConfig;

/// Resolve the data directory: `ROUNDTABLE_DATA_DIR` if set, otherwise
/// `~/.roundtable`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ROUNDTABLE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".roundtable")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}
