//! Ingestion orchestration: budget check, resilient fetch, persistence.
//!
//! Per-location failures (fetch, persist) are absorbed into outcome values
//! and never abort the run. Quota-backend failures are the one class that
//! escapes: an unreachable counter store must stop the run rather than be
//! read as an open budget.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::RequestBudget;
use crate::domain::ports::{ObservationRepository, QuotaStoreError};
use crate::domain::{Location, Observation};

mod breaker;
mod fetcher;
mod outcome;
mod runtime;

pub use breaker::BreakerConfig;
pub use fetcher::FetchFailure;
use fetcher::ResilientFetcher;
pub use outcome::{LocationOutcome, LocationReport, RunSummary};
pub use runtime::{IngestPorts, IngestRuntime, RetrySleeper, TokioSleeper};

/// Ingestion tuning: budget ceiling plus retry and breaker policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Maximum permitted upstream calls per budget window.
    pub max_requests_per_day: u64,
    /// Retries after the first failed attempt (4 attempts total by default).
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub initial_backoff: Duration,
    /// Consecutive outer-call failures required to open the circuit.
    pub circuit_failure_threshold: u32,
    /// Cool-down while the circuit stays open.
    pub circuit_open_cooldown: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_requests_per_day: 1_000,
            max_retries: 3,
            initial_backoff: Duration::from_secs(2),
            circuit_failure_threshold: 5,
            circuit_open_cooldown: Duration::from_secs(60),
        }
    }
}

/// Failure that aborts a whole ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// The budget counter store could not be reached.
    #[error("quota store unavailable: {message}")]
    QuotaUnavailable {
        /// Underlying failure description.
        message: String,
    },
}

impl From<QuotaStoreError> for IngestError {
    fn from(error: QuotaStoreError) -> Self {
        let QuotaStoreError::Backend { message } = error;
        Self::QuotaUnavailable { message }
    }
}

/// Domain-owned ingestion orchestrator.
///
/// Owns the single process-wide circuit breaker and the request budget;
/// collaborators arrive as ports so tests can substitute deterministic
/// implementations.
pub struct IngestService {
    budget: RequestBudget,
    repository: Arc<dyn ObservationRepository>,
    fetcher: ResilientFetcher,
}

impl IngestService {
    /// Build a service using default runtime dependencies.
    pub fn new(ports: IngestPorts, clock: Arc<dyn Clock>, config: IngestConfig) -> Self {
        Self::with_runtime(ports, clock, IngestRuntime::default(), config)
    }

    /// Build a service with injected runtime abstractions.
    pub fn with_runtime(
        ports: IngestPorts,
        clock: Arc<dyn Clock>,
        runtime: IngestRuntime,
        config: IngestConfig,
    ) -> Self {
        Self {
            budget: RequestBudget::new(ports.quota, config.max_requests_per_day),
            repository: ports.repository,
            fetcher: ResilientFetcher::new(
                ports.source,
                clock,
                runtime.sleeper,
                config.max_retries,
                config.initial_backoff,
                BreakerConfig {
                    failure_threshold: config.circuit_failure_threshold,
                    open_cooldown: config.circuit_open_cooldown,
                },
            ),
        }
    }

    /// Execute one ingestion run over `locations` in the supplied order.
    ///
    /// Completes with a per-location summary despite individual failures;
    /// cancellation stops the run after the in-flight location.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::QuotaUnavailable`] when the budget counter
    /// store cannot be read or written; no further locations are processed.
    pub async fn run(
        &self,
        locations: &[Location],
        shutdown: &CancellationToken,
    ) -> Result<RunSummary, IngestError> {
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, locations = locations.len(), "starting ingestion run");

        let mut summary = RunSummary::new(run_id);
        for location in locations {
            if shutdown.is_cancelled() {
                summary.push(location.name(), LocationOutcome::Cancelled);
                break;
            }

            let outcome = self.process_location(location, shutdown).await?;
            let cancelled = outcome == LocationOutcome::Cancelled;
            summary.push(location.name(), outcome);
            if cancelled {
                break;
            }
        }

        info!(
            run_id = %run_id,
            ingested = summary.ingested(),
            skipped_by_quota = summary.skipped_by_quota(),
            failed_fetch = summary.failed_fetch(),
            failed_persist = summary.failed_persist(),
            cancelled = summary.cancelled(),
            "ingestion run complete"
        );
        Ok(summary)
    }

    async fn process_location(
        &self,
        location: &Location,
        shutdown: &CancellationToken,
    ) -> Result<LocationOutcome, IngestError> {
        info!(location = location.name(), "fetching current weather");

        if self.budget.is_exceeded().await? {
            warn!(
                location = location.name(),
                "request budget exhausted; skipping location"
            );
            return Ok(LocationOutcome::SkippedByQuota);
        }

        let observation = match self.fetcher.fetch(location, shutdown).await {
            Ok(observation) => observation,
            Err(FetchFailure::Cancelled) => {
                warn!(location = location.name(), "run cancelled mid-fetch");
                return Ok(LocationOutcome::Cancelled);
            }
            Err(failure) => {
                error!(
                    location = location.name(),
                    error = %failure,
                    "failed to fetch weather data"
                );
                return Ok(LocationOutcome::FetchFailed {
                    reason: failure.to_string(),
                });
            }
        };

        info!(
            location = observation.location_name.as_str(),
            temperature = observation.measurements.temperature,
            condition = observation.condition.description.as_str(),
            "observation fetched"
        );

        let persisted = self.save(&observation).await;
        // The budget tracks upstream usage, so a successful fetch is counted
        // even when persistence fails.
        self.budget.consume().await?;

        Ok(match persisted {
            Ok(()) => LocationOutcome::Ingested,
            Err(reason) => LocationOutcome::PersistFailed { reason },
        })
    }

    async fn save(&self, observation: &Observation) -> Result<(), String> {
        self.repository.save(observation).await.map_err(|failure| {
            error!(
                location = observation.location_name.as_str(),
                error = %failure,
                "failed to persist observation"
            );
            failure.to_string()
        })
    }
}

#[cfg(test)]
mod tests;
