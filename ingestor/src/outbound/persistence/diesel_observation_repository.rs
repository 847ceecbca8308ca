//! PostgreSQL-backed adapter for persisting observations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;

use crate::domain::Observation;
use crate::domain::ports::{ObservationRepository, ObservationRepositoryError};

use super::pool::{DbPool, PoolError};
use super::schema::observations;

/// Diesel-backed implementation of [`ObservationRepository`].
///
/// Each save is a single atomic insert; `recorded_at` is stamped from the
/// injected clock at save time.
#[derive(Clone)]
pub struct DieselObservationRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselObservationRepository {
    /// Create a repository backed by `pool`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = observations)]
struct NewObservationRow<'a> {
    location_name: &'a str,
    longitude: f64,
    latitude: f64,
    condition: &'a str,
    description: &'a str,
    temperature: f64,
    feels_like: f64,
    temperature_min: f64,
    temperature_max: f64,
    pressure: f64,
    humidity: f64,
    recorded_at: DateTime<Utc>,
}

fn to_insert_row<'a>(
    observation: &'a Observation,
    recorded_at: DateTime<Utc>,
) -> NewObservationRow<'a> {
    NewObservationRow {
        location_name: observation.location_name.as_str(),
        longitude: observation.longitude,
        latitude: observation.latitude,
        condition: observation.condition.category.as_str(),
        description: observation.condition.description.as_str(),
        temperature: observation.measurements.temperature,
        feels_like: observation.measurements.feels_like,
        temperature_min: observation.measurements.temperature_min,
        temperature_max: observation.measurements.temperature_max,
        pressure: observation.measurements.pressure,
        humidity: observation.measurements.humidity,
        recorded_at,
    }
}

fn map_pool_error(error: PoolError) -> ObservationRepositoryError {
    ObservationRepositoryError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> ObservationRepositoryError {
    ObservationRepositoryError::query(error.to_string())
}

#[async_trait]
impl ObservationRepository for DieselObservationRepository {
    async fn save(&self, observation: &Observation) -> Result<(), ObservationRepositoryError> {
        let row = to_insert_row(observation, self.clock.utc());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(observations::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    use crate::domain::{Condition, Measurements};

    #[rstest]
    fn insert_row_maps_the_full_observation_envelope() {
        let observation = Observation {
            location_name: "Edinburgh".to_owned(),
            longitude: -3.19,
            latitude: 55.95,
            condition: Condition {
                category: "Clouds".to_owned(),
                description: "scattered clouds".to_owned(),
            },
            measurements: Measurements {
                temperature: 14.2,
                feels_like: 13.1,
                temperature_min: 12.0,
                temperature_max: 16.4,
                pressure: 1012.0,
                humidity: 77.0,
            },
        };
        let recorded_at = Utc
            .with_ymd_and_hms(2026, 8, 1, 9, 0, 0)
            .single()
            .expect("valid time");

        let row = to_insert_row(&observation, recorded_at);

        assert_eq!(row.location_name, "Edinburgh");
        assert_eq!(row.longitude, -3.19);
        assert_eq!(row.latitude, 55.95);
        assert_eq!(row.condition, "Clouds");
        assert_eq!(row.description, "scattered clouds");
        assert_eq!(row.temperature, 14.2);
        assert_eq!(row.feels_like, 13.1);
        assert_eq!(row.temperature_min, 12.0);
        assert_eq!(row.temperature_max, 16.4);
        assert_eq!(row.pressure, 1012.0);
        assert_eq!(row.humidity, 77.0);
        assert_eq!(row.recorded_at, recorded_at);
    }
}
