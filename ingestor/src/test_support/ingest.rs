//! Clock, sleeper, and quota-store doubles shared by unit and behaviour tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::RetrySleeper;
use crate::domain::ports::{QuotaStore, QuotaStoreError};

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("failed to convert Duration to TimeDelta: {error}"),
        };
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

#[async_trait]
impl RetrySleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

#[derive(Default)]
pub struct RecordingSleeper(pub Mutex<Vec<Duration>>);

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        let mut entries = match self.0.lock() {
            Ok(entries) => entries,
            Err(_) => panic!("sleeper mutex"),
        };
        entries.push(duration);
    }
}

/// Sleeper that never wakes, for exercising cancellation during backoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingSleeper;

#[async_trait]
impl RetrySleeper for PendingSleeper {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}

/// In-memory quota store honouring the first-use expiry contract: the 24 h
/// window is applied only when an increment creates the key.
#[derive(Default)]
pub struct InMemoryQuotaStore {
    count: Mutex<Option<u64>>,
    expiry_applications: AtomicUsize,
}

impl InMemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing counter value (key already created upstream).
    pub fn with_count(count: u64) -> Self {
        Self {
            count: Mutex::new(Some(count)),
            expiry_applications: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> u64 {
        self.lock_count().unwrap_or(0)
    }

    pub fn expiry_applications(&self) -> usize {
        self.expiry_applications.load(Ordering::SeqCst)
    }

    fn lock_count(&self) -> Option<u64> {
        match self.count.lock() {
            Ok(guard) => *guard,
            Err(_) => panic!("count mutex"),
        }
    }
}

#[async_trait]
impl QuotaStore for InMemoryQuotaStore {
    async fn current(&self) -> Result<u64, QuotaStoreError> {
        Ok(self.count())
    }

    async fn increment(&self) -> Result<u64, QuotaStoreError> {
        let mut guard = match self.count.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("count mutex"),
        };
        let created = guard.is_none();
        let next = guard.unwrap_or(0).saturating_add(1);
        *guard = Some(next);
        if created {
            self.expiry_applications.fetch_add(1, Ordering::SeqCst);
        }
        Ok(next)
    }

    async fn put(&self, value: u64) -> Result<(), QuotaStoreError> {
        match self.count.lock() {
            Ok(mut guard) => *guard = Some(value),
            Err(_) => panic!("count mutex"),
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), QuotaStoreError> {
        match self.count.lock() {
            Ok(mut guard) => *guard = Some(0),
            Err(_) => panic!("count mutex"),
        }
        self.expiry_applications.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Quota store whose every operation fails with a backend error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingQuotaStore;

#[async_trait]
impl QuotaStore for FailingQuotaStore {
    async fn current(&self) -> Result<u64, QuotaStoreError> {
        Err(QuotaStoreError::backend("quota store unreachable"))
    }

    async fn increment(&self) -> Result<u64, QuotaStoreError> {
        Err(QuotaStoreError::backend("quota store unreachable"))
    }

    async fn put(&self, _value: u64) -> Result<(), QuotaStoreError> {
        Err(QuotaStoreError::backend("quota store unreachable"))
    }

    async fn reset(&self) -> Result<(), QuotaStoreError> {
        Err(QuotaStoreError::backend("quota store unreachable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn expiry_applies_only_when_increment_creates_the_key() {
        let store = InMemoryQuotaStore::new();

        for _ in 0..3 {
            store.increment().await.expect("increment succeeds");
        }

        assert_eq!(store.count(), 3);
        assert_eq!(store.expiry_applications(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn existing_counter_never_gains_a_fresh_expiry_from_increments() {
        let store = InMemoryQuotaStore::with_count(999);

        store.increment().await.expect("increment succeeds");

        assert_eq!(store.count(), 1000);
        assert_eq!(store.expiry_applications(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn reset_zeroes_the_counter_with_a_fresh_expiry() {
        let store = InMemoryQuotaStore::with_count(42);

        store.reset().await.expect("reset succeeds");

        assert_eq!(store.count(), 0);
        assert_eq!(store.expiry_applications(), 1);
    }
}
