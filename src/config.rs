//! Configuration module
//!
//! `AppConfig` is read from a TOML file
//! (default `~/.config/fleet-ledger/config.toml`). A missing file is
//! replaced by the defaults, which are written back for the operator to edit.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::OdometerOrder;
use crate::shared::types::InfraError;

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fleet-ledger")
        .join("config.toml")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub fleet: FleetConfig,
}

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SeaORM connection URL
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error (RUST_LOG wins when set)
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

/// Knobs of the core ledgers and registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Default window for odometer statistics
    pub stats_period_days: u32,
    /// Oldest accepted vehicle year
    pub min_vehicle_year: i32,
    /// How many years past the current one a vehicle year may be
    pub max_years_ahead: i32,
    /// Currency reported with card balances
    pub currency: String,
    /// Deadline for a single record-store call
    pub store_timeout_ms: u64,
    /// "insertion" or "timestamp"
    pub odometer_order: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseSection::default(),
            logging: LoggingConfig::default(),
            fleet: FleetConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./fleet.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            stats_period_days: 30,
            min_vehicle_year: 1900,
            max_years_ahead: 1,
            currency: "EUR".to_string(),
            store_timeout_ms: 5_000,
            odometer_order: "insertion".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Load from `path`, creating the file with defaults when absent.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!("Default configuration written to {}", path.display());
            return Ok(config);
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), InfraError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Settings handed to the core services
    pub fn fleet_settings(&self) -> FleetSettings {
        FleetSettings::from(&self.fleet)
    }
}

/// Runtime settings of the core services
#[derive(Debug, Clone)]
pub struct FleetSettings {
    pub stats_period_days: u32,
    pub min_vehicle_year: i32,
    pub max_years_ahead: i32,
    pub currency: String,
    pub store_timeout: Duration,
    pub odometer_order: OdometerOrder,
}

impl FleetSettings {
    /// Inclusive range of accepted vehicle years as of today
    pub fn year_window(&self) -> (i32, i32) {
        (
            self.min_vehicle_year,
            Utc::now().year() + self.max_years_ahead,
        )
    }
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self::from(&FleetConfig::default())
    }
}

impl From<&FleetConfig> for FleetSettings {
    fn from(cfg: &FleetConfig) -> Self {
        Self {
            stats_period_days: cfg.stats_period_days.max(1),
            min_vehicle_year: cfg.min_vehicle_year,
            max_years_ahead: cfg.max_years_ahead,
            currency: cfg.currency.clone(),
            store_timeout: Duration::from_millis(cfg.store_timeout_ms.max(1)),
            odometer_order: cfg.odometer_order.parse().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9100

            [fleet]
            stats_period_days = 7
            odometer_order = "timestamp"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.fleet.currency, "EUR");

        let settings = cfg.fleet_settings();
        assert_eq!(settings.stats_period_days, 7);
        assert_eq!(settings.odometer_order, OdometerOrder::Timestamp);
        assert_eq!(settings.store_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn year_window_reaches_next_year() {
        let settings = FleetSettings::default();
        let (min, max) = settings.year_window();
        assert_eq!(min, 1900);
        assert_eq!(max, Utc::now().year() + 1);
    }

    #[test]
    fn load_writes_defaults_when_missing() {
        let dir = std::env::temp_dir().join(format!("fleet-ledger-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.fleet.stats_period_days, 30);
        assert!(path.exists());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
