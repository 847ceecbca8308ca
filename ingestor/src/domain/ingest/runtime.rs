//! Port and runtime dependency bundles for the ingestion service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{ObservationRepository, QuotaStore, WeatherSource};

/// Port bundle required by the ingestion service.
pub struct IngestPorts {
    /// Outbound upstream weather adapter.
    pub source: Arc<dyn WeatherSource>,
    /// Observation persistence adapter.
    pub repository: Arc<dyn ObservationRepository>,
    /// Distributed budget counter adapter.
    pub quota: Arc<dyn QuotaStore>,
}

impl IngestPorts {
    /// Build a strongly-typed port bundle.
    pub fn new(
        source: Arc<dyn WeatherSource>,
        repository: Arc<dyn ObservationRepository>,
        quota: Arc<dyn QuotaStore>,
    ) -> Self {
        Self {
            source,
            repository,
            quota,
        }
    }
}

/// Runtime helpers used by the retry policy.
pub struct IngestRuntime {
    /// Async sleep implementation for backoff waits.
    pub sleeper: Arc<dyn RetrySleeper>,
}

impl Default for IngestRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
        }
    }
}

/// Async clock-independent sleeping abstraction for backoff waits.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
