//! User configuration for the monitor and menu-bar surfaces.
//!
//! Stores configuration in JSON format at `~/.portify/config.json`.
//! Every field is optional on disk; missing values take their defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub menubar: MenubarConfig,
}

impl Config {
    /// Keys accepted by [`Config::set`].
    pub const KEYS: [&'static str; 6] = [
        "monitor.interval_secs",
        "monitor.include_system_info",
        "menubar.max_ports_shown",
        "menubar.refresh_interval_secs",
        "menubar.show_notifications",
        "menubar.auto_refresh",
    ];

    /// Set one value by its dotted key, e.g. `menubar.auto_refresh`.
    ///
    /// Intervals and the port count must be at least 1.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "monitor.interval_secs" => self.monitor.interval_secs = parse_positive(key, value)?,
            "monitor.include_system_info" => {
                self.monitor.include_system_info = parse_bool(key, value)?
            }
            "menubar.max_ports_shown" => {
                self.menubar.max_ports_shown = parse_positive(key, value)?
            }
            "menubar.refresh_interval_secs" => {
                self.menubar.refresh_interval_secs = parse_positive(key, value)?
            }
            "menubar.show_notifications" => {
                self.menubar.show_notifications = parse_bool(key, value)?
            }
            "menubar.auto_refresh" => self.menubar.auto_refresh = parse_bool(key, value)?,
            _ => {
                return Err(Error::Config(format!(
                    "Unknown key '{}' (expected one of: {})",
                    key,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(Error::Config(format!(
            "Invalid value '{}' for {}: expected true or false",
            value, key
        ))),
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr + PartialOrd + From<u8>,
{
    value
        .parse::<T>()
        .ok()
        .filter(|n| *n >= T::from(1))
        .ok_or_else(|| {
            Error::Config(format!(
                "Invalid value '{}' for {}: expected a whole number of at least 1",
                value, key
            ))
        })
}

/// Defaults for `portify monitor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between refreshes.
    pub interval_secs: u64,

    /// Sample CPU and memory for each owning process.
    pub include_system_info: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 2,
            include_system_info: false,
        }
    }
}

/// Defaults for `portify menubar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenubarConfig {
    /// Port entries shown before collapsing into "... and N more".
    pub max_ports_shown: usize,

    /// Seconds between automatic refreshes.
    pub refresh_interval_secs: u64,

    pub show_notifications: bool,

    pub auto_refresh: bool,
}

impl Default for MenubarConfig {
    fn default() -> Self {
        Self {
            max_ports_shown: 7,
            refresh_interval_secs: 5,
            show_notifications: true,
            auto_refresh: true,
        }
    }
}

/// Configuration store for managing app settings.
///
/// Handles reading and writing configuration to `~/.portify/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.portify/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".portify").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        debug!(path = %self.config_path.display(), "Config saved");
        Ok(())
    }

    /// Load, modify and save in one step. Nothing is written if `apply`
    /// fails.
    pub async fn update(&self, apply: impl FnOnce(&mut Config) -> Result<()>) -> Result<Config> {
        let mut config = self.load().await?;
        apply(&mut config)?;
        self.save(&config).await?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio_test::assert_ok;

    fn test_store() -> (ConfigStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        (ConfigStore::with_path(path), dir)
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (store, _dir) = test_store();
        let config = store.load().await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.monitor.interval_secs, 2);
        assert_eq!(config.menubar.max_ports_shown, 7);
        assert!(config.menubar.auto_refresh);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _dir) = test_store();

        let mut config = Config::default();
        config.monitor.include_system_info = true;
        config.menubar.refresh_interval_secs = 30;

        assert_ok!(store.save(&config).await);
        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"menubar": {"max_ports_shown": 3}}"#).unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.menubar.max_ports_shown, 3);
        assert_eq!(config.menubar.refresh_interval_secs, 5);
        assert_eq!(config.monitor, MonitorConfig::default());
    }

    #[tokio::test]
    async fn test_invalid_file() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_set_by_key() {
        let mut config = Config::default();

        config.set("menubar.auto_refresh", "off").unwrap();
        config.set("monitor.interval_secs", "10").unwrap();
        config.set("menubar.max_ports_shown", "12").unwrap();

        assert!(!config.menubar.auto_refresh);
        assert_eq!(config.monitor.interval_secs, 10);
        assert_eq!(config.menubar.max_ports_shown, 12);
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = Config::default();

        let err = config.set("menubar.colour", "blue").unwrap_err();
        assert!(err.to_string().contains("Unknown key"));
        assert!(config.set("menubar.refresh_interval_secs", "0").is_err());
        assert!(config.set("monitor.interval_secs", "-3").is_err());
        assert!(config.set("menubar.show_notifications", "maybe").is_err());
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_update() {
        let (store, _dir) = test_store();

        assert_ok!(
            store
                .update(|config| config.set("menubar.show_notifications", "false"))
                .await
        );

        let loaded = store.load().await.unwrap();
        assert!(!loaded.menubar.show_notifications);
        assert!(loaded.menubar.auto_refresh);
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() {
        let (store, _dir) = test_store();

        let result = store.update(|config| config.set("monitor.interval_secs", "0")).await;

        assert!(result.is_err());
        assert!(!store.path().exists());
    }
}
