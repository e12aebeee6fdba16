//! ASIT Daily configuration management
//! Handles loading, saving and validating the config file

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::schedule::ScheduleConfig;

/// ASIT Daily configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Database path
    #[serde(default = "default_db_path")]
    pub database_path: String,

    /// Journal profile; each profile has at most one therapy session
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Phase lengths and maintenance dose bounds
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// What to do when a recorded dose differs from the schedule
    #[serde(default)]
    pub dose_check: DoseCheckPolicy,
}

fn default_db_path() -> String {
    "~/.asit-daily/asit-daily.db".to_string()
}

fn default_profile() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            profile: default_profile(),
            schedule: ScheduleConfig::default(),
            dose_check: DoseCheckPolicy::default(),
        }
    }
}

/// Cross-check of administered clicks against the prescribed dose
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DoseCheckPolicy {
    /// Store whatever was administered
    Off,
    /// Store it and log a warning on mismatch
    #[default]
    Warn,
    /// Refuse to store a mismatching dose
    Strict,
}

impl Config {
    /// Load config from the default location or specified path
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = Self::config_path(path)?;

        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&raw).context("Failed to parse config file")?;
        config
            .schedule
            .validate()
            .context("Invalid schedule section in config file")?;

        debug!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    /// Save config to the default location or specified path
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let config_path = Self::config_path(path)?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(&self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        info!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Get the config file path
    fn config_path(path: Option<&str>) -> Result<PathBuf> {
        // Check env override first
        if let Ok(env_path) = std::env::var("ASIT_DAILY_CONFIG") {
            return Ok(PathBuf::from(env_path));
        }

        if let Some(p) = path {
            return Ok(PathBuf::from(p));
        }

        let home = dirs::home_dir().context("Cannot find home directory")?;
        Ok(home.join(".asit-daily").join("config.yml"))
    }

    /// Resolve database path (expand ~)
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        if !self.database_path.starts_with('~') {
            return Ok(PathBuf::from(&self.database_path));
        }
        let home = dirs::home_dir().context("Cannot find home directory")?;
        let path = self
            .database_path
            .replacen('~', &home.to_string_lossy(), 1);
        Ok(PathBuf::from(path))
    }
}
