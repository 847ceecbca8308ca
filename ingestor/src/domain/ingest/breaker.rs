//! Circuit breaker state machine guarding the upstream fetch.
//!
//! Failures are counted per outer call (after retry exhaustion), not per
//! attempt. The machine is pure: the fetcher owns the mutex around it and
//! turns returned transitions into observability events.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Circuit breaker tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive outer-call failures required to open the breaker.
    pub failure_threshold: u32,
    /// Cool-down period while the breaker remains open.
    pub open_cooldown: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed { consecutive_failures: u32 },
    Open { opened_at: DateTime<Utc> },
    HalfOpen,
}

/// Admission decision for one outer fetch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Admission {
    /// The call may proceed (in `HalfOpen` this is the single probe).
    Allowed,
    /// The breaker is open (or a probe is already in flight); fail fast.
    Denied,
}

/// State transition caused by recording a call outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Transition {
    /// No externally interesting change.
    None,
    /// The failure threshold was reached and the circuit opened.
    Opened,
    /// A half-open probe failed and the circuit re-opened.
    Reopened,
    /// A half-open probe succeeded and the circuit reset to closed.
    Reset,
}

/// Breaker state kind exposed for test assertions.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerStateKind {
    /// Calls pass through.
    Closed,
    /// Calls fail fast until the cool-down elapses.
    Open,
    /// Exactly one probe call is in flight.
    HalfOpen,
}

/// Process-wide circuit breaker over the upstream fetch operation.
pub(super) struct CircuitBreaker {
    config: BreakerConfig,
    state: State,
}

impl CircuitBreaker {
    pub(super) fn new(config: BreakerConfig) -> Self {
        Self {
            config: BreakerConfig {
                failure_threshold: config.failure_threshold.max(1),
                open_cooldown: config.open_cooldown,
            },
            state: State::Closed {
                consecutive_failures: 0,
            },
        }
    }

    /// Decide whether one outer call may proceed.
    ///
    /// An open breaker whose cool-down has elapsed moves to `HalfOpen` and
    /// admits the caller as the single probe; further callers are denied
    /// until the probe outcome is recorded.
    pub(super) fn admit(&mut self, now: DateTime<Utc>) -> Admission {
        match self.state {
            State::Closed { .. } => Admission::Allowed,
            State::Open { opened_at }
                if cooldown_elapsed(opened_at, now, self.config.open_cooldown) =>
            {
                self.state = State::HalfOpen;
                Admission::Allowed
            }
            State::Open { .. } | State::HalfOpen => Admission::Denied,
        }
    }

    /// Record a successful outer call.
    pub(super) fn record_success(&mut self) -> Transition {
        let transition = match self.state {
            State::HalfOpen => Transition::Reset,
            State::Closed { .. } | State::Open { .. } => Transition::None,
        };
        self.state = State::Closed {
            consecutive_failures: 0,
        };
        transition
    }

    /// Record a failed outer call.
    pub(super) fn record_failure(&mut self, now: DateTime<Utc>) -> Transition {
        match self.state {
            State::Closed {
                consecutive_failures,
            } => {
                let failures = consecutive_failures.saturating_add(1);
                if failures >= self.config.failure_threshold {
                    self.state = State::Open { opened_at: now };
                    Transition::Opened
                } else {
                    self.state = State::Closed {
                        consecutive_failures: failures,
                    };
                    Transition::None
                }
            }
            State::HalfOpen => {
                self.state = State::Open { opened_at: now };
                Transition::Reopened
            }
            State::Open { .. } => Transition::None,
        }
    }

    /// Record a cancelled outer call.
    ///
    /// A cancelled probe neither closes the circuit nor counts as a failure;
    /// it returns the breaker to `Open` with a restarted cool-down so the
    /// one-probe-at-a-time rule holds for any later caller.
    pub(super) fn record_cancelled(&mut self, now: DateTime<Utc>) {
        if self.state == State::HalfOpen {
            self.state = State::Open { opened_at: now };
        }
    }

    #[cfg(test)]
    pub(super) fn state_kind(&self) -> BreakerStateKind {
        match self.state {
            State::Closed { .. } => BreakerStateKind::Closed,
            State::Open { .. } => BreakerStateKind::Open,
            State::HalfOpen => BreakerStateKind::HalfOpen,
        }
    }
}

fn cooldown_elapsed(opened_at: DateTime<Utc>, now: DateTime<Utc>, cooldown: Duration) -> bool {
    // Fail open when the std->chrono conversion fails: the alternative is a
    // breaker that can never leave the open state.
    let Ok(cooldown) = chrono::Duration::from_std(cooldown) else {
        return true;
    };

    now >= opened_at + cooldown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0)
            .single()
            .expect("valid time")
    }

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(BreakerConfig {
            failure_threshold: 5,
            open_cooldown: Duration::from_secs(60),
        })
    }

    #[rstest]
    fn opens_exactly_on_the_fifth_consecutive_failure(now: DateTime<Utc>) {
        let mut breaker = breaker();
        for _ in 0..4 {
            assert_eq!(breaker.record_failure(now), Transition::None);
            assert_eq!(breaker.admit(now), Admission::Allowed);
        }

        assert_eq!(breaker.record_failure(now), Transition::Opened);
        assert_eq!(breaker.state_kind(), BreakerStateKind::Open);
    }

    #[rstest]
    fn success_clears_the_consecutive_failure_count(now: DateTime<Utc>) {
        let mut breaker = breaker();
        for _ in 0..4 {
            breaker.record_failure(now);
        }
        breaker.record_success();

        // Four more failures only reach a count of four again.
        for _ in 0..4 {
            assert_eq!(breaker.record_failure(now), Transition::None);
        }
        assert_eq!(breaker.state_kind(), BreakerStateKind::Closed);
    }

    #[rstest]
    fn open_denies_until_cooldown_elapses(now: DateTime<Utc>) {
        let mut breaker = breaker();
        for _ in 0..5 {
            breaker.record_failure(now);
        }

        assert_eq!(breaker.admit(now), Admission::Denied);
        assert_eq!(
            breaker.admit(now + chrono::Duration::seconds(59)),
            Admission::Denied
        );
    }

    #[rstest]
    fn cooldown_admits_exactly_one_probe(now: DateTime<Utc>) {
        let mut breaker = breaker();
        for _ in 0..5 {
            breaker.record_failure(now);
        }

        let later = now + chrono::Duration::seconds(60);
        assert_eq!(breaker.admit(later), Admission::Allowed);
        assert_eq!(breaker.state_kind(), BreakerStateKind::HalfOpen);
        assert_eq!(breaker.admit(later), Admission::Denied);
    }

    #[rstest]
    fn probe_success_resets_the_circuit(now: DateTime<Utc>) {
        let mut breaker = breaker();
        for _ in 0..5 {
            breaker.record_failure(now);
        }
        let later = now + chrono::Duration::seconds(60);
        breaker.admit(later);

        assert_eq!(breaker.record_success(), Transition::Reset);
        assert_eq!(breaker.state_kind(), BreakerStateKind::Closed);

        // The failure count restarted from zero.
        for _ in 0..4 {
            assert_eq!(breaker.record_failure(later), Transition::None);
        }
    }

    #[rstest]
    fn probe_failure_reopens_and_restarts_cooldown(now: DateTime<Utc>) {
        let mut breaker = breaker();
        for _ in 0..5 {
            breaker.record_failure(now);
        }
        let probe_at = now + chrono::Duration::seconds(60);
        breaker.admit(probe_at);

        assert_eq!(breaker.record_failure(probe_at), Transition::Reopened);
        assert_eq!(
            breaker.admit(probe_at + chrono::Duration::seconds(59)),
            Admission::Denied
        );
        assert_eq!(
            breaker.admit(probe_at + chrono::Duration::seconds(60)),
            Admission::Allowed
        );
    }

    #[rstest]
    fn cancelled_probe_restarts_cooldown_without_counting_a_failure(now: DateTime<Utc>) {
        let mut breaker = CircuitBreaker::new(BreakerConfig {
            failure_threshold: 1,
            open_cooldown: Duration::from_secs(60),
        });
        breaker.record_failure(now);
        let probe_at = now + chrono::Duration::seconds(60);
        breaker.admit(probe_at);

        breaker.record_cancelled(probe_at);
        assert_eq!(breaker.state_kind(), BreakerStateKind::Open);
        assert_eq!(breaker.admit(probe_at), Admission::Denied);
        assert_eq!(
            breaker.admit(probe_at + chrono::Duration::seconds(60)),
            Admission::Allowed
        );
    }
}
