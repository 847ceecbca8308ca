//! Per-location outcomes and the aggregated run summary.
//!
//! Skips and failures are values, not control flow: every processed location
//! yields exactly one outcome, and the run completes with a summary even when
//! individual locations fail.

use uuid::Uuid;

/// Outcome of one location's pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationOutcome {
    /// Fetched, persisted, and counted against the budget.
    Ingested,
    /// The daily budget was exhausted; no fetch was attempted.
    SkippedByQuota,
    /// The resilient fetch ultimately failed (retries exhausted or circuit
    /// open); nothing was persisted or counted.
    FetchFailed {
        /// Failure description for the run report.
        reason: String,
    },
    /// The fetch succeeded and was counted, but persistence failed.
    PersistFailed {
        /// Failure description for the run report.
        reason: String,
    },
    /// The run was cancelled while this location was in flight.
    Cancelled,
}

/// One location's entry in the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationReport {
    /// Location name as configured.
    pub location: String,
    /// What happened to it.
    pub outcome: LocationOutcome,
}

/// Aggregated result of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Run identifier for log correlation.
    pub run_id: Uuid,
    /// Per-location reports in processing order.
    pub reports: Vec<LocationReport>,
}

impl RunSummary {
    pub(super) fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            reports: Vec::new(),
        }
    }

    pub(super) fn push(&mut self, location: &str, outcome: LocationOutcome) {
        self.reports.push(LocationReport {
            location: location.to_owned(),
            outcome,
        });
    }

    /// Number of fully ingested locations.
    pub fn ingested(&self) -> usize {
        self.count(|outcome| matches!(outcome, LocationOutcome::Ingested))
    }

    /// Number of locations skipped by the exhausted budget.
    pub fn skipped_by_quota(&self) -> usize {
        self.count(|outcome| matches!(outcome, LocationOutcome::SkippedByQuota))
    }

    /// Number of locations whose fetch ultimately failed.
    pub fn failed_fetch(&self) -> usize {
        self.count(|outcome| matches!(outcome, LocationOutcome::FetchFailed { .. }))
    }

    /// Number of locations fetched but not persisted.
    pub fn failed_persist(&self) -> usize {
        self.count(|outcome| matches!(outcome, LocationOutcome::PersistFailed { .. }))
    }

    /// Number of locations cut short by cancellation.
    pub fn cancelled(&self) -> usize {
        self.count(|outcome| matches!(outcome, LocationOutcome::Cancelled))
    }

    fn count(&self, matcher: impl Fn(&LocationOutcome) -> bool) -> usize {
        self.reports
            .iter()
            .filter(|report| matcher(&report.outcome))
            .count()
    }
}
