//! Configuration for loadline
//!
//! One TOML file covers the data source the dashboard talks to, the
//! dashboard's ordering defaults and the bundled data server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, catalog::DEFAULT_HISTORY_DAYS, source::SortKey};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadlineConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub server: ServerSection,
}

/// Where flight data comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Base URL of the logistics REST API
    pub base_url: String,

    /// Sent as `Authorization: Bearer ...` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,

    #[serde(default = "default_timeout", with = "crate::utils::duration_secs")]
    pub request_timeout: Duration,

    /// Read flights from a local JSON file instead of the REST API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub sort_by: SortKey,

    #[serde(default = "default_true")]
    pub descending: bool,

    /// Days of history per route for unscoped charts
    #[serde(default = "default_history_days")]
    pub history_days: usize,
}

/// Settings for `loadline-server`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind_address: String,

    /// Flight data served by the server
    pub data_file: PathBuf,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

fn default_history_days() -> usize {
    DEFAULT_HISTORY_DAYS
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            bearer_token: None,
            request_timeout: default_timeout(),
            data_file: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sort_by: SortKey::default(),
            descending: true,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            data_file: PathBuf::from("data/flights.json"),
        }
    }
}

/// Resolve a path relative to a base directory
/// If the path is absolute, return it as-is
fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Load configuration from a TOML file
pub async fn load_config(path: &Path) -> Result<LoadlineConfig> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        crate::CoreError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "file".to_string(),
            expected: "readable TOML file".to_string(),
            cause: crate::error::ConfigError::Io(e.to_string()),
        }
    })?;

    let mut config: LoadlineConfig =
        toml::from_str(&content).map_err(|e| crate::CoreError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "content".to_string(),
            expected: "valid TOML configuration".to_string(),
            cause: crate::error::ConfigError::TomlParse(e.to_string()),
        })?;

    // Data files are relative to the config file's directory
    let base_dir = path.parent().unwrap_or(Path::new("."));
    if let Some(ref data_file) = config.data.data_file {
        config.data.data_file = Some(resolve_path(base_dir, data_file));
    }
    config.server.data_file = resolve_path(base_dir, &config.server.data_file);

    Ok(config)
}

/// Save configuration to a TOML file
pub async fn save_config(config: &LoadlineConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            crate::CoreError::ConfigurationError {
                config_path: parent.display().to_string(),
                field: "directory".to_string(),
                expected: "writable directory".to_string(),
                cause: crate::error::ConfigError::Io(e.to_string()),
            }
        })?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| crate::CoreError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "serialization".to_string(),
            expected: "serializable config structure".to_string(),
            cause: crate::error::ConfigError::TomlSerialize(e.to_string()),
        })?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| crate::CoreError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "file".to_string(),
            expected: "writable file location".to_string(),
            cause: crate::error::ConfigError::Io(e.to_string()),
        })?;

    Ok(())
}

/// Standard config file locations
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("loadline.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("loadline").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".loadline").join("config.toml"));
    }

    paths
}

/// Load configuration from standard locations, falling back to defaults
pub async fn load_config_from_standard_locations() -> Result<LoadlineConfig> {
    for path in config_paths() {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            return load_config(&path).await;
        }
    }

    Ok(LoadlineConfig::default())
}

impl LoadlineConfig {
    pub async fn load() -> Result<Self> {
        load_config_from_standard_locations().await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        load_config(path).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        save_config(self, path).await
    }

    /// Save to the first standard location whose directory exists
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = config_paths()
            .into_iter()
            .find(|p| p.parent().is_some_and(|parent| parent.exists()))
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("loadline")
                    .join("config.toml")
            });

        self.save_to(&config_path).await?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_dashboard_behavior() {
        let config = LoadlineConfig::default();
        assert_eq!(config.dashboard.history_days, 10);
        assert_eq!(config.dashboard.sort_by, SortKey::UtilizationPercent);
        assert!(config.dashboard.descending);
        assert_eq!(config.data.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: LoadlineConfig = toml::from_str(
            r#"
            [data]
            base_url = "https://logistics.example.com"
            request_timeout = 5

            [dashboard]
            sort_by = "flightDate"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.base_url, "https://logistics.example.com");
        assert_eq!(config.data.request_timeout, Duration::from_secs(5));
        assert_eq!(config.dashboard.sort_by, SortKey::FlightDate);
        assert!(config.dashboard.descending);
        assert_eq!(config.server, ServerSection::default());
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("loadline.toml");

        let mut config = LoadlineConfig::default();
        config.data.bearer_token = Some("secret".to_string());
        config.data.data_file = Some(PathBuf::from("flights.json"));
        config.dashboard.history_days = 7;

        save_config(&config, &path).await.unwrap();
        let loaded = load_config(&path).await.unwrap();

        assert_eq!(loaded.data.bearer_token.as_deref(), Some("secret"));
        assert_eq!(loaded.dashboard.history_days, 7);
        assert_eq!(
            loaded.data.data_file,
            Some(dir.path().join("nested").join("flights.json"))
        );
    }

    #[tokio::test]
    async fn malformed_file_reports_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        tokio::fs::write(&path, "[data\nbase_url = ").await.unwrap();

        let err = load_config(&path).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::ConfigurationError { ref field, .. } if field == "content"
        ));
    }
}
