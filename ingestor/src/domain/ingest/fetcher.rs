//! Resilient wrapper around the upstream fetch: retry with exponential
//! backoff beneath a circuit-breaker admission gate.
//!
//! The breaker sees one success or failure per outer call, never per retry
//! attempt. While the breaker is open no upstream attempt happens at all.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use mockable::Clock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::ports::{WeatherSource, WeatherSourceError};
use crate::domain::{Location, Observation};

use super::breaker::{Admission, BreakerConfig, CircuitBreaker, Transition};
use super::runtime::RetrySleeper;

/// Terminal failure of one resilient fetch call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    /// All attempts failed; carries the last upstream error.
    #[error(transparent)]
    Upstream(#[from] WeatherSourceError),
    /// The circuit breaker is open; no attempt was made.
    #[error("upstream circuit breaker is open")]
    CircuitOpen,
    /// The run was cancelled while fetching or backing off.
    #[error("fetch cancelled by shutdown")]
    Cancelled,
    /// Process-local resilience state became unavailable.
    #[error("resilience state unavailable: {message}")]
    Internal {
        /// Underlying failure description.
        message: String,
    },
}

/// Outcome of the retry loop, before breaker accounting.
enum RetryOutcome {
    Exhausted(WeatherSourceError),
    Cancelled,
}

pub(super) struct ResilientFetcher {
    source: Arc<dyn WeatherSource>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn RetrySleeper>,
    max_retries: u32,
    initial_backoff: Duration,
    breaker: Mutex<CircuitBreaker>,
}

impl ResilientFetcher {
    pub(super) fn new(
        source: Arc<dyn WeatherSource>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn RetrySleeper>,
        max_retries: u32,
        initial_backoff: Duration,
        breaker: BreakerConfig,
    ) -> Self {
        Self {
            source,
            clock,
            sleeper,
            max_retries,
            initial_backoff,
            breaker: Mutex::new(CircuitBreaker::new(breaker)),
        }
    }

    /// Perform one breaker-gated, retried fetch for `location`.
    pub(super) async fn fetch(
        &self,
        location: &Location,
        shutdown: &CancellationToken,
    ) -> Result<Observation, FetchFailure> {
        let admission = self.lock_breaker()?.admit(self.clock.utc());
        if admission == Admission::Denied {
            return Err(FetchFailure::CircuitOpen);
        }

        match self.fetch_with_retry(location, shutdown).await {
            Ok(observation) => {
                if self.lock_breaker()?.record_success() == Transition::Reset {
                    info!(location = location.name(), "circuit reset");
                }
                Ok(observation)
            }
            Err(RetryOutcome::Cancelled) => {
                self.lock_breaker()?.record_cancelled(self.clock.utc());
                Err(FetchFailure::Cancelled)
            }
            Err(RetryOutcome::Exhausted(failure)) => {
                match self.lock_breaker()?.record_failure(self.clock.utc()) {
                    Transition::Opened => error!(
                        location = location.name(),
                        error = %failure,
                        "circuit opened after repeated upstream failures"
                    ),
                    Transition::Reopened => warn!(
                        location = location.name(),
                        error = %failure,
                        "circuit probe failed; cool-down restarted"
                    ),
                    Transition::None | Transition::Reset => {}
                }
                Err(FetchFailure::Upstream(failure))
            }
        }
    }

    async fn fetch_with_retry(
        &self,
        location: &Location,
        shutdown: &CancellationToken,
    ) -> Result<Observation, RetryOutcome> {
        let max_attempts = self.max_retries.saturating_add(1);
        let mut attempt = 1_u32;
        loop {
            let result = tokio::select! {
                () = shutdown.cancelled() => return Err(RetryOutcome::Cancelled),
                result = self.source.fetch_current(location) => result,
            };

            let failure = match result {
                Ok(observation) => return Ok(observation),
                Err(failure) if attempt < max_attempts => failure,
                Err(failure) => return Err(RetryOutcome::Exhausted(failure)),
            };

            let delay = self.retry_delay(attempt);
            warn!(
                location = location.name(),
                attempt,
                delay_seconds = delay.as_secs(),
                error = %failure,
                "retrying upstream fetch"
            );
            tokio::select! {
                () = shutdown.cancelled() => return Err(RetryOutcome::Cancelled),
                () = self.sleeper.sleep(delay) => {}
            }
            attempt = attempt.saturating_add(1);
        }
    }

    /// Delay before retry `attempt`: doubles each time from the initial
    /// backoff (2 s, 4 s, 8 s with the defaults).
    fn retry_delay(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
    }

    fn lock_breaker(&self) -> Result<MutexGuard<'_, CircuitBreaker>, FetchFailure> {
        self.breaker.lock().map_err(|_| FetchFailure::Internal {
            message: "circuit breaker state poisoned".to_owned(),
        })
    }

    #[cfg(test)]
    pub(super) fn circuit_state(&self) -> super::breaker::BreakerStateKind {
        match self.breaker.lock() {
            Ok(breaker) => breaker.state_kind(),
            Err(_) => panic!("breaker mutex"),
        }
    }
}
