//! Driven port for persisting fetched observations.

use async_trait::async_trait;

use crate::domain::Observation;

/// Errors surfaced while saving an observation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObservationRepositoryError {
    /// A connection could not be obtained from the pool.
    #[error("observation store connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// The insert itself failed.
    #[error("observation insert failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
}

impl ObservationRepositoryError {
    /// Create an [`ObservationRepositoryError::Connection`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an [`ObservationRepositoryError::Query`].
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for persisting one observation.
///
/// The adapter performs a single atomic insert; the pipeline never retries
/// persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObservationRepository: Send + Sync {
    /// Persist `observation`.
    async fn save(&self, observation: &Observation) -> Result<(), ObservationRepositoryError>;
}
