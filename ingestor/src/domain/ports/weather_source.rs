//! Driven port for fetching current weather from the upstream API.
//!
//! The adapter owns transport, status, and payload concerns only; retry and
//! circuit-breaking are layered on top by the resilient fetcher.

use async_trait::async_trait;

use crate::domain::{Location, Observation};

/// Errors surfaced while fetching from the upstream weather API.
///
/// Every variant is retried the same way by the resilient fetcher; the
/// distinctions exist for diagnostics, not for routing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeatherSourceError {
    /// Network transport failed before a response arrived.
    #[error("upstream transport failed: {message}")]
    Transport {
        /// Underlying failure description.
        message: String,
    },
    /// The upstream call exceeded its timeout.
    #[error("upstream timeout: {message}")]
    Timeout {
        /// Underlying failure description.
        message: String,
    },
    /// The upstream returned a non-success HTTP status.
    #[error("upstream rejected request: {message}")]
    Status {
        /// Status code plus a body preview.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("upstream payload decode failed: {message}")]
    Decode {
        /// Underlying failure description.
        message: String,
    },
    /// The payload decoded but lacks the fields a valid observation needs.
    #[error("upstream payload incomplete: {message}")]
    MissingData {
        /// Which required part was absent.
        message: String,
    },
}

impl WeatherSourceError {
    /// Create a [`WeatherSourceError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a [`WeatherSourceError::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a [`WeatherSourceError::Status`].
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    /// Create a [`WeatherSourceError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a [`WeatherSourceError::MissingData`].
    pub fn missing_data(message: impl Into<String>) -> Self {
        Self::MissingData {
            message: message.into(),
        }
    }
}

/// Port for one upstream current-weather fetch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the current observation for `location`.
    async fn fetch_current(
        &self,
        location: &Location,
    ) -> Result<Observation, WeatherSourceError>;
}
