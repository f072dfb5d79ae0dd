//! Circuit breaker guarding the stats API.
//!
//! stats.nba.com throttles aggressively and tends to hang rather than fail
//! fast when it does. After `failure_threshold` consecutive upstream faults
//! the breaker opens and every command gets an immediate "unavailable"
//! reply until `recovery_timeout` has passed. Then a few trial requests
//! decide whether to close again.
//!
//! Only faults of the upstream count. Callers decide what that means; the
//! stats client counts transport errors, 5xx and 429 responses, but not a
//! 4xx caused by one bad query.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct ApiCircuitBreakerConfig {
    /// Consecutive upstream faults before opening
    pub failure_threshold: u32,
    /// Time spent open before a trial request
    pub recovery_timeout: Duration,
    /// Half-open successes needed to close
    pub success_threshold: u32,
}

impl Default for ApiCircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { failures: u32 },
    Open { since: Instant },
    HalfOpen { successes: u32 },
}

pub struct ApiCircuitBreaker {
    name: String,
    config: ApiCircuitBreakerConfig,
    phase: Mutex<Phase>,
}

impl ApiCircuitBreaker {
    pub fn new(name: &str, config: ApiCircuitBreakerConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            phase: Mutex::new(Phase::Closed { failures: 0 }),
        }
    }

    /// Whether a request may go out now. An open breaker whose recovery
    /// timeout has elapsed moves to half-open and lets the request through.
    pub fn is_available(&self) -> bool {
        let mut phase = self.phase.lock();
        match *phase {
            Phase::Closed { .. } | Phase::HalfOpen { .. } => true,
            Phase::Open { since } if since.elapsed() >= self.config.recovery_timeout => {
                tracing::info!("Circuit '{}' half-open, retrying upstream", self.name);
                *phase = Phase::HalfOpen { successes: 0 };
                true
            }
            Phase::Open { .. } => false,
        }
    }

    /// Time left before an open breaker allows a trial request
    pub fn retry_after(&self) -> Option<Duration> {
        match *self.phase.lock() {
            Phase::Open { since } => {
                Some(self.config.recovery_timeout.saturating_sub(since.elapsed()))
            }
            _ => None,
        }
    }

    pub fn record_success(&self) {
        let mut phase = self.phase.lock();
        *phase = match *phase {
            Phase::HalfOpen { successes } if successes + 1 < self.config.success_threshold => {
                Phase::HalfOpen {
                    successes: successes + 1,
                }
            }
            Phase::HalfOpen { .. } => {
                tracing::info!("Circuit '{}' closed, upstream recovered", self.name);
                Phase::Closed { failures: 0 }
            }
            Phase::Closed { .. } => Phase::Closed { failures: 0 },
            // a response that raced the trip; stay open
            open @ Phase::Open { .. } => open,
        };
    }

    /// Record one upstream fault
    pub fn record_failure(&self) {
        let mut phase = self.phase.lock();
        *phase = match *phase {
            Phase::Closed { failures } if failures + 1 < self.config.failure_threshold => {
                Phase::Closed {
                    failures: failures + 1,
                }
            }
            Phase::Closed { failures } => {
                tracing::warn!(
                    "Circuit '{}' opened after {} consecutive upstream faults",
                    self.name,
                    failures + 1
                );
                Phase::Open {
                    since: Instant::now(),
                }
            }
            Phase::HalfOpen { .. } => {
                tracing::warn!("Circuit '{}' half-open request failed, reopening", self.name);
                Phase::Open {
                    since: Instant::now(),
                }
            }
            Phase::Open { since } => Phase::Open { since },
        };
    }

    pub fn state(&self) -> ApiCircuitState {
        match *self.phase.lock() {
            Phase::Closed { .. } => ApiCircuitState::Closed,
            Phase::Open { .. } => ApiCircuitState::Open,
            Phase::HalfOpen { .. } => ApiCircuitState::HalfOpen,
        }
    }

    /// Consecutive faults counted while closed
    pub fn failure_count(&self) -> u32 {
        match *self.phase.lock() {
            Phase::Closed { failures } => failures,
            _ => 0,
        }
    }
}

impl std::fmt::Debug for ApiCircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCircuitBreaker")
            .field("name", &self.name)
            .field("phase", &*self.phase.lock())
            .finish()
    }
}
