//! Unit tests for ingestion orchestration.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};
use tokio_util::sync::CancellationToken;

use super::breaker::BreakerStateKind;
use super::{
    IngestConfig, IngestError, IngestPorts, IngestRuntime, IngestService, LocationOutcome,
    RetrySleeper,
};
use crate::domain::ports::{
    ObservationRepository, ObservationRepositoryError, WeatherSource, WeatherSourceError,
};
use crate::domain::{Condition, Location, Measurements, Observation};
use crate::test_support::ingest::{
    FailingQuotaStore, InMemoryQuotaStore, MutableClock, PendingSleeper, RecordingSleeper,
};

struct SourceStub {
    scripted: Mutex<VecDeque<Result<Observation, WeatherSourceError>>>,
    calls: AtomicUsize,
}

impl SourceStub {
    fn scripted(scripted: Vec<Result<Observation, WeatherSourceError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl WeatherSource for SourceStub {
    async fn fetch_current(
        &self,
        _location: &Location,
    ) -> Result<Observation, WeatherSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scripted
            .lock()
            .expect("source mutex")
            .pop_front()
            .unwrap_or_else(|| {
                Err(WeatherSourceError::transport(
                    "source script exhausted unexpectedly",
                ))
            })
    }
}

struct RepoStub {
    scripted: Mutex<VecDeque<Result<(), ObservationRepositoryError>>>,
    calls: AtomicUsize,
    saved: Mutex<Vec<Observation>>,
}

impl RepoStub {
    fn new(scripted: Vec<Result<(), ObservationRepositoryError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            calls: AtomicUsize::new(0),
            saved: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ObservationRepository for RepoStub {
    async fn save(&self, observation: &Observation) -> Result<(), ObservationRepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.saved
            .lock()
            .expect("repo mutex")
            .push(observation.clone());
        self.scripted
            .lock()
            .expect("repo mutex")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0)
        .single()
        .expect("valid time")
}

fn location(name: &str) -> Location {
    Location::new(name, -3.19, 55.95).expect("valid location")
}

fn observation(name: &str) -> Observation {
    Observation {
        location_name: name.to_owned(),
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
    }
}

fn config() -> IngestConfig {
    IngestConfig {
        max_requests_per_day: 1_000,
        max_retries: 3,
        initial_backoff: Duration::from_secs(2),
        circuit_failure_threshold: 5,
        circuit_open_cooldown: Duration::from_secs(60),
    }
}

struct Harness {
    source: Arc<SourceStub>,
    repository: Arc<RepoStub>,
    quota: Arc<InMemoryQuotaStore>,
    clock: Arc<MutableClock>,
    sleeper: Arc<RecordingSleeper>,
    service: IngestService,
}

fn harness(
    source_script: Vec<Result<Observation, WeatherSourceError>>,
    repo_script: Vec<Result<(), ObservationRepositoryError>>,
    quota: Arc<InMemoryQuotaStore>,
    cfg: IngestConfig,
    now: DateTime<Utc>,
) -> Harness {
    let source = Arc::new(SourceStub::scripted(source_script));
    let repository = Arc::new(RepoStub::new(repo_script));
    let clock = Arc::new(MutableClock::new(now));
    let sleeper = Arc::new(RecordingSleeper::default());
    let service = IngestService::with_runtime(
        IngestPorts::new(source.clone(), repository.clone(), quota.clone()),
        clock.clone(),
        IngestRuntime {
            sleeper: sleeper.clone(),
        },
        cfg,
    );
    Harness {
        source,
        repository,
        quota,
        clock,
        sleeper,
        service,
    }
}

fn service_with_sleeper(
    source_script: Vec<Result<Observation, WeatherSourceError>>,
    quota: Arc<InMemoryQuotaStore>,
    sleeper: Arc<dyn RetrySleeper>,
    cfg: IngestConfig,
    now: DateTime<Utc>,
) -> (Arc<SourceStub>, IngestService) {
    let source = Arc::new(SourceStub::scripted(source_script));
    let service = IngestService::with_runtime(
        IngestPorts::new(source.clone(), Arc::new(RepoStub::new(Vec::new())), quota),
        Arc::new(MutableClock::new(now)),
        IngestRuntime { sleeper },
        cfg,
    );
    (source, service)
}
