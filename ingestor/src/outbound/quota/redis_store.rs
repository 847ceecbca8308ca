//! Redis-backed budget counter adapter.
//!
//! One fixed key per deployment. The window is anchored to first use: the
//! 24 h expiry is applied exactly when `INCR` reports it created the key
//! (returned value 1) and never refreshed by later increments, so the budget
//! rolls over 24 hours after the first request of a cycle.

use async_trait::async_trait;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::{RedisConnectionManager, bb8};

use crate::domain::ports::{QuotaStore, QuotaStoreError};

/// Budget window length applied as the counter key's expiry.
const BUDGET_WINDOW_SECONDS: i64 = 86_400;

/// Redis implementation of the [`QuotaStore`] port over a bb8 pool.
pub struct RedisQuotaStore {
    pool: bb8::Pool<RedisConnectionManager>,
    key: String,
}

impl RedisQuotaStore {
    /// Connect a pooled client for `url`, counting under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaStoreError::Backend`] when the connection manager or
    /// pool cannot be built.
    pub async fn connect(url: &str, key: impl Into<String>) -> Result<Self, QuotaStoreError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|error| QuotaStoreError::backend(error.to_string()))?;
        let pool = bb8::Pool::builder()
            .build(manager)
            .await
            .map_err(|error| QuotaStoreError::backend(error.to_string()))?;
        Ok(Self {
            pool,
            key: key.into(),
        })
    }

    async fn connection(
        &self,
    ) -> Result<bb8::PooledConnection<'_, RedisConnectionManager>, QuotaStoreError> {
        self.pool
            .get()
            .await
            .map_err(|error| QuotaStoreError::backend(error.to_string()))
    }
}

#[async_trait]
impl QuotaStore for RedisQuotaStore {
    async fn current(&self) -> Result<u64, QuotaStoreError> {
        let mut conn = self.connection().await?;
        let value: Option<u64> = conn
            .get(&self.key)
            .await
            .map_err(|error| QuotaStoreError::backend(error.to_string()))?;
        Ok(value.unwrap_or(0))
    }

    async fn increment(&self) -> Result<u64, QuotaStoreError> {
        let mut conn = self.connection().await?;
        let count: u64 = conn
            .incr(&self.key, 1_u64)
            .await
            .map_err(|error| QuotaStoreError::backend(error.to_string()))?;
        if count == 1 {
            // INCR created the key: anchor the window to this first use.
            let _: bool = conn
                .expire(&self.key, BUDGET_WINDOW_SECONDS)
                .await
                .map_err(|error| QuotaStoreError::backend(error.to_string()))?;
        }
        Ok(count)
    }

    async fn put(&self, value: u64) -> Result<(), QuotaStoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .set(&self.key, value)
            .await
            .map_err(|error| QuotaStoreError::backend(error.to_string()))?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), QuotaStoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .set_ex(&self.key, 0_u64, BUDGET_WINDOW_SECONDS as u64)
            .await
            .map_err(|error| QuotaStoreError::backend(error.to_string()))?;
        Ok(())
    }
}
