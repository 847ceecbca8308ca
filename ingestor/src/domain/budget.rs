//! The daily request budget shared across orchestrator instances.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{QuotaStore, QuotaStoreError};

/// Rate limiter over the distributed budget counter.
///
/// `is_exceeded` never mutates; `consume` is one atomic increment. The two
/// calls are deliberately not atomic as a pair; concurrent runs may overrun
/// the budget by a small margin, which the upstream contract tolerates.
///
/// Backend errors always propagate: treating an unreachable counter store as
/// an open budget would permit unbounded upstream calls.
pub struct RequestBudget {
    store: Arc<dyn QuotaStore>,
    max_requests: u64,
}

impl RequestBudget {
    /// Build a budget over `store` with the configured daily maximum.
    pub fn new(store: Arc<dyn QuotaStore>, max_requests: u64) -> Self {
        Self {
            store,
            max_requests,
        }
    }

    /// Return whether the daily maximum has been reached.
    ///
    /// # Errors
    ///
    /// Propagates [`QuotaStoreError`] when the counter cannot be read.
    pub async fn is_exceeded(&self) -> Result<bool, QuotaStoreError> {
        let used = self.store.current().await?;
        info!(used, max = self.max_requests, "request budget check");
        Ok(used >= self.max_requests)
    }

    /// Consume one unit of the budget.
    ///
    /// # Errors
    ///
    /// Propagates [`QuotaStoreError`] when the counter cannot be written.
    pub async fn consume(&self) -> Result<(), QuotaStoreError> {
        self.store.increment().await.map(|_| ())
    }

    /// Read the counter value (operational inspection).
    ///
    /// # Errors
    ///
    /// Propagates [`QuotaStoreError`] when the counter cannot be read.
    pub async fn current(&self) -> Result<u64, QuotaStoreError> {
        self.store.current().await
    }

    /// Overwrite the counter value (operational override).
    ///
    /// # Errors
    ///
    /// Propagates [`QuotaStoreError`] when the counter cannot be written.
    pub async fn put(&self, value: u64) -> Result<(), QuotaStoreError> {
        self.store.put(value).await
    }

    /// Reset the counter to zero with a fresh 24 h expiry.
    ///
    /// # Errors
    ///
    /// Propagates [`QuotaStoreError`] when the counter cannot be written.
    pub async fn reset(&self) -> Result<(), QuotaStoreError> {
        self.store.reset().await
    }
}
