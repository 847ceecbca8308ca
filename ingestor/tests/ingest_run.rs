//! End-to-end ingestion runs driven through the public crate surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rstest::rstest;
use tokio_util::sync::CancellationToken;

use ingestor::domain::ports::{
    ObservationRepository, ObservationRepositoryError, WeatherSource, WeatherSourceError,
};
use ingestor::domain::{
    Condition, IngestConfig, IngestPorts, IngestService, Location, Measurements, Observation,
};
use ingestor::test_support::ingest::{InMemoryQuotaStore, MutableClock};

struct FixedSource {
    calls: AtomicUsize,
}

#[async_trait]
impl WeatherSource for FixedSource {
    async fn fetch_current(
        &self,
        location: &Location,
    ) -> Result<Observation, WeatherSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Observation {
            location_name: location.name().to_owned(),
            longitude: location.longitude(),
            latitude: location.latitude(),
            condition: Condition {
                category: "Clear".to_owned(),
                description: "clear sky".to_owned(),
            },
            measurements: Measurements {
                temperature: 18.0,
                feels_like: 17.2,
                temperature_min: 15.0,
                temperature_max: 20.1,
                pressure: 1019.0,
                humidity: 52.0,
            },
        })
    }
}

#[derive(Default)]
struct CountingRepository {
    calls: AtomicUsize,
}

#[async_trait]
impl ObservationRepository for CountingRepository {
    async fn save(&self, _observation: &Observation) -> Result<(), ObservationRepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn service(quota: Arc<InMemoryQuotaStore>) -> (Arc<FixedSource>, Arc<CountingRepository>, IngestService) {
    let source = Arc::new(FixedSource {
        calls: AtomicUsize::new(0),
    });
    let repository = Arc::new(CountingRepository::default());
    let clock = Arc::new(MutableClock::new(
        Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0)
            .single()
            .expect("valid time"),
    ));
    let service = IngestService::new(
        IngestPorts::new(source.clone(), repository.clone(), quota),
        clock,
        IngestConfig::default(),
    );
    (source, repository, service)
}

#[rstest]
#[tokio::test]
async fn run_ingests_the_final_budget_unit() {
    let quota = Arc::new(InMemoryQuotaStore::with_count(999));
    let (source, repository, service) = service(quota.clone());
    let location = Location::new("Edinburgh", -3.19, 55.95).expect("valid location");

    let summary = service
        .run(&[location], &CancellationToken::new())
        .await
        .expect("run completes");

    assert_eq!(summary.ingested(), 1);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(repository.calls.load(Ordering::SeqCst), 1);
    assert_eq!(quota.count(), 1_000);
}

#[rstest]
#[tokio::test]
async fn run_skips_everything_once_the_budget_is_spent() {
    let quota = Arc::new(InMemoryQuotaStore::with_count(1_000));
    let (source, repository, service) = service(quota.clone());
    let locations = [
        Location::new("Edinburgh", -3.19, 55.95).expect("valid location"),
        Location::new("Glasgow", -4.25, 55.86).expect("valid location"),
    ];

    let summary = service
        .run(&locations, &CancellationToken::new())
        .await
        .expect("run completes");

    assert_eq!(summary.skipped_by_quota(), 2);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert_eq!(repository.calls.load(Ordering::SeqCst), 0);
    assert_eq!(quota.count(), 1_000);
}
