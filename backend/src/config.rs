//! # Configuration
//!
//! Settings are read from `scheduler.yaml`, looked up first in the working
//! directory and then in the default data directory. Any field left out of
//! the file keeps its default. Environment variables win over the file:
//!
//! - `SCHEDULER_DATA_DIR`: where `appointments.csv` and `users.yaml` live
//! - `SCHEDULER_BIND_ADDRESS`: socket address of the REST server
//! - `SCHEDULER_CORS_ORIGIN`: origin allowed to call the API from a browser
//!
//! ```yaml
//! data_directory: /var/lib/counsel-scheduler
//! bind_address: 0.0.0.0:3000
//! cors_origin: http://localhost:8080
//! default_time: "09:00"
//! week_start: monday
//! reload_interval_secs: 10
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::calendar::WeekStart;
use crate::domain::scheduler::SchedulerSettings;

pub const CONFIG_FILE: &str = "scheduler.yaml";
pub const DATA_DIR_ENV: &str = "SCHEDULER_DATA_DIR";
pub const BIND_ADDRESS_ENV: &str = "SCHEDULER_BIND_ADDRESS";
pub const CORS_ORIGIN_ENV: &str = "SCHEDULER_CORS_ORIGIN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_directory: PathBuf,
    pub bind_address: String,
    pub cors_origin: String,
    #[serde(with = "shared::hh_mm")]
    pub default_time: NaiveTime,
    pub week_start: WeekStart,
    /// How often the data files are re-read for changes made by other
    /// processes. Zero turns polling off.
    pub reload_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            bind_address: "127.0.0.1:3000".to_string(),
            cors_origin: "http://localhost:8080".to_string(),
            default_time: SchedulerSettings::default().default_time,
            week_start: WeekStart::default(),
            reload_interval_secs: 5,
        }
    }
}

impl AppConfig {
    /// Load from the first `scheduler.yaml` found, then apply environment overrides
    pub fn load() -> Result<Self> {
        let candidates = [PathBuf::from(CONFIG_FILE), default_data_directory().join(CONFIG_FILE)];

        let mut config = match candidates.iter().find(|path| path.exists()) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                info!("No {} found, using defaults", CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if config_content.trim().is_empty() {
            warn!("{:?} is empty, using defaults", config_path);
            return Ok(Self::default());
        }

        serde_yaml::from_str(&config_content).with_context(|| format!("Failed to parse config YAML: {:?}", config_path))
    }

    /// Override fields from `lookup`, normally the process environment.
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(data_directory) = value(DATA_DIR_ENV) {
            self.data_directory = PathBuf::from(data_directory);
        }
        if let Some(bind_address) = value(BIND_ADDRESS_ENV) {
            self.bind_address = bind_address;
        }
        if let Some(cors_origin) = value(CORS_ORIGIN_ENV) {
            self.cors_origin = cors_origin;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_address()?;
        if self.cors_origin.trim().is_empty() {
            return Err(anyhow!("cors_origin must not be empty"));
        }
        if self.data_directory.as_os_str().is_empty() {
            return Err(anyhow!("data_directory must not be empty"));
        }
        Ok(())
    }

    pub fn socket_address(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.bind_address))
    }

    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_interval_secs > 0).then(|| Duration::from_secs(self.reload_interval_secs))
    }

    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            week_start: self.week_start,
            default_time: self.default_time,
        }
    }
}

/// `<local data dir>/counsel-scheduler`, falling back to the temp directory
pub fn default_data_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join("counsel-scheduler")
}
