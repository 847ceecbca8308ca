//! Ingestor configuration loaded via OrthoConfig.
//!
//! Scalar values merge from config file, environment (prefix `INGESTOR_`),
//! and CLI arguments, read once at startup. The location list lives in its
//! own JSON file referenced by `locations_path`; entries are validated into
//! domain [`Location`] values, preserving their order, before the run starts.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{Location, LocationValidationError};

const DEFAULT_MAX_REQUESTS_PER_DAY: u64 = 1_000;
const DEFAULT_QUOTA_KEY: &str = "ingestor:request-budget";
const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const DEFAULT_WEATHER_UNITS: &str = "metric";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

fn default_locations_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("locations.json")
}

/// One configured location entry, before domain validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationEntry {
    /// Human-readable location name.
    pub name: String,
    /// Longitude in WGS84 degrees.
    pub longitude: f64,
    /// Latitude in WGS84 degrees.
    pub latitude: f64,
}

/// Errors raised while loading the location list.
#[derive(Debug, thiserror::Error)]
pub enum LocationLoadError {
    /// The locations file could not be read.
    #[error("failed to read locations file {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The locations file is not valid JSON for the expected shape.
    #[error("failed to parse locations file {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying decode failure.
        source: serde_json::Error,
    },
    /// An entry failed domain validation.
    #[error("invalid location entry: {source}")]
    Invalid {
        /// Underlying validation failure.
        #[from]
        source: LocationValidationError,
    },
}

/// Configuration values controlling one ingestion run.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "INGESTOR")]
pub struct IngestorSettings {
    /// Path to the JSON file listing locations in processing order.
    pub locations_path: Option<PathBuf>,
    /// Maximum permitted upstream calls per budget window.
    pub max_requests_per_day: Option<u64>,
    /// Counter key addressing this deployment's budget.
    pub quota_key: Option<String>,
    /// Upstream current-weather endpoint.
    pub weather_base_url: Option<String>,
    /// Upstream API key.
    pub weather_api_key: Option<String>,
    /// Measurement units requested upstream.
    pub weather_units: Option<String>,
    /// Redis connection URL for the budget counter.
    pub redis_url: Option<String>,
    /// PostgreSQL connection URL for observation persistence.
    pub database_url: Option<String>,
}

impl IngestorSettings {
    /// Return the configured locations file, falling back to the default.
    pub fn locations_path(&self) -> PathBuf {
        self.locations_path
            .clone()
            .unwrap_or_else(default_locations_path)
    }

    /// Load and validate the location list from [`Self::locations_path`].
    ///
    /// # Errors
    ///
    /// Returns a [`LocationLoadError`] when the file cannot be read or
    /// parsed, or when an entry fails domain validation.
    pub fn load_locations(&self) -> Result<Vec<Location>, LocationLoadError> {
        let path = self.locations_path();
        let raw = std::fs::read(&path).map_err(|source| LocationLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let entries: Vec<LocationEntry> =
            serde_json::from_slice(&raw).map_err(|source| LocationLoadError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok(validate_entries(entries)?)
    }

    /// Return the configured daily maximum, falling back to the default.
    pub fn max_requests_per_day(&self) -> u64 {
        self.max_requests_per_day
            .unwrap_or(DEFAULT_MAX_REQUESTS_PER_DAY)
    }

    /// Return the configured quota key, falling back to the default.
    pub fn quota_key(&self) -> &str {
        self.quota_key.as_deref().unwrap_or(DEFAULT_QUOTA_KEY)
    }

    /// Return the configured upstream endpoint, falling back to the default.
    pub fn weather_base_url(&self) -> &str {
        self.weather_base_url
            .as_deref()
            .unwrap_or(DEFAULT_WEATHER_BASE_URL)
    }

    /// Return the upstream API key, if configured.
    pub fn weather_api_key(&self) -> Option<&str> {
        self.weather_api_key.as_deref()
    }

    /// Return the configured units, falling back to the default.
    pub fn weather_units(&self) -> &str {
        self.weather_units
            .as_deref()
            .unwrap_or(DEFAULT_WEATHER_UNITS)
    }

    /// Return the configured Redis URL, falling back to the default.
    pub fn redis_url(&self) -> &str {
        self.redis_url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }

    /// Return the database URL, if configured.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }
}

fn validate_entries(entries: Vec<LocationEntry>) -> Result<Vec<Location>, LocationValidationError> {
    entries
        .into_iter()
        .map(|entry| Location::new(entry.name, entry.longitude, entry.latitude))
        .collect()
}
