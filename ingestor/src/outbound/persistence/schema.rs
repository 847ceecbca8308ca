//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! `diesel print-schema` can regenerate them from a live database.

diesel::table! {
    /// Persisted weather observations, one row per successful fetch.
    observations (id) {
        /// Primary key.
        id -> Int8,
        /// Location name echoed by the upstream response.
        location_name -> Varchar,
        /// Longitude in WGS84 degrees.
        longitude -> Float8,
        /// Latitude in WGS84 degrees.
        latitude -> Float8,
        /// Primary condition category, e.g. `Clouds`.
        condition -> Varchar,
        /// Primary condition description, e.g. `scattered clouds`.
        description -> Varchar,
        /// Temperature in the configured units.
        temperature -> Float8,
        /// Perceived temperature.
        feels_like -> Float8,
        /// Minimum temperature currently observed in the area.
        temperature_min -> Float8,
        /// Maximum temperature currently observed in the area.
        temperature_max -> Float8,
        /// Atmospheric pressure in hPa.
        pressure -> Float8,
        /// Relative humidity in percent.
        humidity -> Float8,
        /// Save-time timestamp.
        recorded_at -> Timestamptz,
    }
}
