//! Wire-format payload for the upstream current-weather endpoint.

use serde::Deserialize;

use crate::domain::{Condition, Measurements, Observation};

#[derive(Debug, Deserialize)]
pub(super) struct CurrentWeatherDto {
    name: String,
    coord: CoordDto,
    #[serde(default)]
    weather: Vec<ConditionDto>,
    main: Option<MeasurementsDto>,
}

#[derive(Debug, Deserialize)]
struct CoordDto {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionDto {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct MeasurementsDto {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
}

impl CurrentWeatherDto {
    /// Convert into the domain observation, rejecting payloads that lack the
    /// measurement block or any condition entry.
    pub(super) fn into_observation(self) -> Result<Observation, String> {
        let measurements = self
            .main
            .ok_or_else(|| "measurement block missing from payload".to_owned())?;
        // The first condition entry is the primary one; an empty list means
        // "no data" and must not be persisted.
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| "condition list empty in payload".to_owned())?;

        Ok(Observation {
            location_name: self.name,
            longitude: self.coord.lon,
            latitude: self.coord.lat,
            condition: Condition {
                category: condition.main,
                description: condition.description,
            },
            measurements: Measurements {
                temperature: measurements.temp,
                feels_like: measurements.feels_like,
                temperature_min: measurements.temp_min,
                temperature_max: measurements.temp_max,
                pressure: measurements.pressure,
                humidity: measurements.humidity,
            },
        })
    }
}
