//! Ingestor entry point: configuration, adapter wiring, one ingestion run.

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ingestor::config::IngestorSettings;
use ingestor::domain::ports::QuotaStore;
use ingestor::domain::{IngestConfig, IngestPorts, IngestService};
use ingestor::outbound::openweather::OpenWeatherHttpSource;
use ingestor::outbound::persistence::{DbPool, DieselObservationRepository, PoolConfig};
use ingestor::outbound::quota::RedisQuotaStore;

const UPSTREAM_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn fatal(message: impl Into<String>) -> std::io::Error {
    std::io::Error::other(message.into())
}

/// Application bootstrap.
#[tokio::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = IngestorSettings::load_from_iter(std::env::args_os())
        .map_err(|error| fatal(format!("failed to load configuration: {error}")))?;

    let locations = settings
        .load_locations()
        .map_err(|error| fatal(format!("invalid location configuration: {error}")))?;
    if locations.is_empty() {
        return Err(fatal("no locations configured"));
    }

    let endpoint = Url::parse(settings.weather_base_url())
        .map_err(|error| fatal(format!("invalid upstream base URL: {error}")))?;
    let api_key = settings
        .weather_api_key()
        .ok_or_else(|| fatal("no upstream API key configured"))?;
    let database_url = settings
        .database_url()
        .ok_or_else(|| fatal("no database URL configured"))?;

    let source = OpenWeatherHttpSource::new(
        endpoint,
        UPSTREAM_REQUEST_TIMEOUT,
        api_key,
        settings.weather_units(),
    )
    .map_err(|error| fatal(format!("failed to build upstream client: {error}")))?;

    let quota = Arc::new(
        RedisQuotaStore::connect(settings.redis_url(), settings.quota_key())
            .await
            .map_err(|error| fatal(format!("failed to connect quota store: {error}")))?,
    );
    // Preflight: an unreachable counter store must stop the run before any
    // upstream call rather than read as an open budget.
    quota
        .current()
        .await
        .map_err(|error| fatal(format!("quota store preflight failed: {error}")))?;

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|error| fatal(format!("failed to build database pool: {error}")))?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repository = Arc::new(DieselObservationRepository::new(pool, clock.clone()));

    let service = IngestService::new(
        IngestPorts::new(Arc::new(source), repository, quota),
        clock,
        IngestConfig {
            max_requests_per_day: settings.max_requests_per_day(),
            ..IngestConfig::default()
        },
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let summary = service
        .run(&locations, &shutdown)
        .await
        .map_err(|error| fatal(error.to_string()))?;

    info!(
        run_id = %summary.run_id,
        ingested = summary.ingested(),
        skipped_by_quota = summary.skipped_by_quota(),
        failed_fetch = summary.failed_fetch(),
        failed_persist = summary.failed_persist(),
        cancelled = summary.cancelled(),
        "weather processing complete"
    );
    Ok(())
}
