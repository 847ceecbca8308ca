//! Domain ports for the hexagonal boundary.

mod observation_repository;
mod quota_store;
mod weather_source;

#[cfg(test)]
pub use observation_repository::MockObservationRepository;
pub use observation_repository::{ObservationRepository, ObservationRepositoryError};
#[cfg(test)]
pub use quota_store::MockQuotaStore;
pub use quota_store::{QuotaStore, QuotaStoreError};
#[cfg(test)]
pub use weather_source::MockWeatherSource;
pub use weather_source::{WeatherSource, WeatherSourceError};
