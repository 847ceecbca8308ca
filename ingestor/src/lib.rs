//! Resilient weather observation ingestor.
//!
//! The domain owns the pipeline (budget check, retried and breaker-gated
//! fetch, persistence hand-off); outbound adapters translate to the upstream
//! HTTP API, Redis, and PostgreSQL.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
