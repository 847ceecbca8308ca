//! Reqwest-backed upstream weather adapter.
//!
//! This adapter owns transport details only: query construction, timeout and
//! HTTP status mapping, and JSON decoding into the domain observation. Retry
//! and circuit-breaking live in the domain's resilient fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::CurrentWeatherDto;
use crate::domain::ports::{WeatherSource, WeatherSourceError};
use crate::domain::{Location, Observation};

/// Upstream adapter performing HTTP GET requests against one endpoint.
pub struct OpenWeatherHttpSource {
    client: Client,
    endpoint: Url,
    api_key: String,
    units: String,
}

impl OpenWeatherHttpSource {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        api_key: impl Into<String>,
        units: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            units: units.into(),
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherHttpSource {
    async fn fetch_current(
        &self,
        location: &Location,
    ) -> Result<Observation, WeatherSourceError> {
        let url = request_url(&self.endpoint, location, &self.units, &self.api_key);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        decode_observation(body.as_ref())
    }
}

fn request_url(endpoint: &Url, location: &Location, units: &str, api_key: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("lat", &location.latitude().to_string())
        .append_pair("lon", &location.longitude().to_string())
        .append_pair("units", units)
        .append_pair("appid", api_key);
    url
}

fn decode_observation(body: &[u8]) -> Result<Observation, WeatherSourceError> {
    let decoded: CurrentWeatherDto = serde_json::from_slice(body).map_err(|error| {
        WeatherSourceError::decode(format!("invalid current-weather JSON payload: {error}"))
    })?;
    decoded
        .into_observation()
        .map_err(WeatherSourceError::missing_data)
}

fn map_transport_error(error: reqwest::Error) -> WeatherSourceError {
    if error.is_timeout() {
        WeatherSourceError::timeout(error.to_string())
    } else {
        WeatherSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> WeatherSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            WeatherSourceError::timeout(message)
        }
        _ => WeatherSourceError::status(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
