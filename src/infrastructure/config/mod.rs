use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

pub const CONFIG_FILE: &str = "county_health.toml";
pub const ENV_PREFIX: &str = "COUNTY_HEALTH_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file holding `zip_county` and `county_health_rankings`.
    pub database_path: PathBuf,
    /// Directory with `obesity.json`, `poverty.json` and `fpm.json`.
    pub data_dir: PathBuf,
    pub busy_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            database_path: PathBuf::from("data.db"),
            data_dir: PathBuf::from("."),
            busy_timeout_secs: 5,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `county_health.toml`, then `COUNTY_HEALTH_*` variables.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {}", e)))
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
