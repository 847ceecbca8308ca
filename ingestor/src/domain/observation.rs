//! The observation envelope produced by a successful upstream fetch.
//!
//! Validity is enforced at the adapter boundary: an upstream payload without
//! a measurement block or without at least one condition entry never becomes
//! an `Observation`; it surfaces as a fetch failure instead.

/// Primary weather condition reported for an observation.
///
/// Upstream responses carry a list of conditions; the first entry is the
/// primary one and the only one retained.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Short condition category, e.g. `Clouds`.
    pub category: String,
    /// Human-readable condition description, e.g. `scattered clouds`.
    pub description: String,
}

/// Numeric measurement block of an observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    /// Current temperature in the configured units.
    pub temperature: f64,
    /// Perceived temperature.
    pub feels_like: f64,
    /// Minimum temperature currently observed in the area.
    pub temperature_min: f64,
    /// Maximum temperature currently observed in the area.
    pub temperature_max: f64,
    /// Atmospheric pressure in hPa.
    pub pressure: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

/// One fetched and parsed weather reading for a location.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Location name echoed by the upstream response.
    pub location_name: String,
    /// Longitude echoed by the upstream response.
    pub longitude: f64,
    /// Latitude echoed by the upstream response.
    pub latitude: f64,
    /// Primary condition (index 0 of the upstream condition list).
    pub condition: Condition,
    /// Numeric measurements.
    pub measurements: Measurements,
}
