//! Driven port for the shared request-budget counter.
//!
//! One fixed key per deployment. The window boundary is the key's own
//! time-to-live: the store applies a 24 h expiry when (and only when) an
//! increment creates the key, anchoring the budget window to first use
//! rather than a calendar day.

use async_trait::async_trait;

/// Errors surfaced when the counter store is unreachable or misbehaves.
///
/// Callers must propagate these rather than treat them as an open budget;
/// see [`crate::domain::RequestBudget`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotaStoreError {
    /// The backing store could not be reached or rejected the command.
    #[error("quota store backend failed: {message}")]
    Backend {
        /// Underlying failure description.
        message: String,
    },
}

impl QuotaStoreError {
    /// Create a [`QuotaStoreError::Backend`].
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Port over the distributed budget counter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Read the current counter value; an absent key reads as zero.
    async fn current(&self) -> Result<u64, QuotaStoreError>;

    /// Atomically increment the counter by one and return the new value.
    ///
    /// When the increment creates the key, the implementation applies the
    /// 24 h expiry; subsequent increments within the window never refresh it.
    async fn increment(&self) -> Result<u64, QuotaStoreError>;

    /// Overwrite the counter value (operational override).
    async fn put(&self, value: u64) -> Result<(), QuotaStoreError>;

    /// Reset the counter to zero with a fresh 24 h expiry.
    async fn reset(&self) -> Result<(), QuotaStoreError>;
}
