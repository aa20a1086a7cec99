//! Runtime configuration loaded from `apple-lifecycle.toml`.
//!
//! Every section is optional and falls back to the defaults below. After the file is read,
//! `APPLE_BACKEND_URL`, `APPLE_PREDICTOR_URL` and `APPLE_BACKEND_MODE` override it
//! (a `.env` file is honoured).

use crate::lifecycle::{LifecycleSettings, Operator};
use crate::model::Route;
use crate::stages::storage::gate::Site;
use crate::stages::{HarvestSettings, StorageSettings, TransitSettings};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "apple-lifecycle.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unknown backend mode '{0}', expected 'ledger' or 'http'")]
    UnknownBackendMode(String),
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Where records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// In-process ledger actor.
    #[default]
    Ledger,
    /// Remote backend over HTTP.
    Http,
}

impl FromStr for BackendMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ledger" => Ok(Self::Ledger),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::UnknownBackendMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorMode {
    /// Remote price predictor over HTTP.
    #[default]
    Http,
    /// Fixed price and freshness, for offline runs.
    Fixed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Ledger,
            base_url: crate::services::backend::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub mode: PredictorMode,
    pub base_url: String,
    /// Price returned in fixed mode; the base price when unset.
    pub fixed_price: Option<u64>,
    pub fixed_freshness: i64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            mode: PredictorMode::Http,
            base_url: crate::services::predictor::DEFAULT_BASE_URL.to_string(),
            fixed_price: None,
            fixed_freshness: 90,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub harvest_interval_ms: u64,
    pub transit_interval_ms: u64,
    pub storage_interval_ms: u64,
    pub stage_transition_ms: u64,
    pub retry_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            harvest_interval_ms: 9_000,
            transit_interval_ms: 3_000,
            storage_interval_ms: 60_000,
            stage_transition_ms: 1_000,
            retry_delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub readings: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            readings: HarvestSettings::default().readings,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransitConfig {
    pub readings: u32,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            readings: TransitSettings::default().readings,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub location: String,
    pub state: String,
    pub initial_price: u64,
    pub ethylene_threshold: u32,
    pub max_readings: Option<u32>,
    pub spoilage_route: Route,
    pub submit_attempts: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let site = Site::default();
        Self {
            location: site.location,
            state: site.state,
            initial_price: 100,
            ethylene_threshold: 10,
            max_readings: None,
            spoilage_route: Route::QuickSale,
            submit_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub predictor: PredictorConfig,
    pub timing: TimingConfig,
    pub harvest: HarvestConfig,
    pub transit: TransitConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` if given, else the default file when it exists, then applies env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::read(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Applies environment-style overrides looked up through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("APPLE_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(url) = lookup("APPLE_PREDICTOR_URL") {
            self.predictor.base_url = url;
        }
        if let Some(mode) = lookup("APPLE_BACKEND_MODE") {
            self.backend.mode = mode.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.initial_price == 0 {
            return Err(ConfigError::Invalid {
                key: "storage.initial_price",
                message: "must be greater than zero".into(),
            });
        }
        if !(0..=100).contains(&self.predictor.fixed_freshness) {
            return Err(ConfigError::Invalid {
                key: "predictor.fixed_freshness",
                message: format!("{} is outside 0-100", self.predictor.fixed_freshness),
            });
        }
        if self.storage.spoilage_route == Route::Completed {
            return Err(ConfigError::Invalid {
                key: "storage.spoilage_route",
                message: "completed is not a remediation".into(),
            });
        }
        Ok(())
    }

    pub fn lifecycle_settings(&self) -> LifecycleSettings {
        let ms = Duration::from_millis;
        LifecycleSettings {
            harvest: HarvestSettings {
                readings: self.harvest.readings,
                interval: ms(self.timing.harvest_interval_ms),
            },
            transit: TransitSettings {
                readings: self.transit.readings,
                interval: ms(self.timing.transit_interval_ms),
            },
            storage: StorageSettings {
                interval: ms(self.timing.storage_interval_ms),
                site: Site {
                    location: self.storage.location.clone(),
                    state: self.storage.state.clone(),
                },
                initial_price: self.storage.initial_price,
                ethylene_threshold: self.storage.ethylene_threshold,
                max_readings: self.storage.max_readings,
            },
            transition_delay: ms(self.timing.stage_transition_ms),
            operator: Operator::new(
                self.storage.submit_attempts,
                ms(self.timing.retry_delay_ms),
                self.storage.spoilage_route,
            ),
        }
    }
}
