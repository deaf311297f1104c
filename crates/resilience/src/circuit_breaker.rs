// SPDX-License-Identifier: MIT

//! Circuit Breaker (C2): gate a thunk by a failure-count state machine
//! (spec §4.2).

use mcpweaver_core::{AppError, Clock};
use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: State,
    failure_count: u32,
    last_failure_epoch_ms: u64,
}

/// Single-breaker circuit breaker. Concurrency on the failure count is
/// serialized by the breaker's own lock (spec §4.2 "Note").
pub struct CircuitBreaker<C: Clock> {
    clock: C,
    max_failures: u32,
    timeout: Duration,
    inner: Mutex<Inner>,
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn new(clock: C, max_failures: u32, timeout: Duration) -> Self {
        Self {
            clock,
            max_failures,
            timeout,
            inner: Mutex::new(Inner { state: State::Closed, failure_count: 0, last_failure_epoch_ms: 0 }),
        }
    }

    /// Execute `f` through the breaker. Returns a recoverable "circuit open"
    /// error with `retry_after = timeout` if the breaker is open and the
    /// timeout hasn't elapsed yet.
    pub async fn execute<T, F, Fut>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        {
            let mut guard = self.inner.lock();
            if guard.state == State::Open {
                let elapsed_ms = self.clock.epoch_ms().saturating_sub(guard.last_failure_epoch_ms);
                if elapsed_ms < self.timeout.as_millis() as u64 {
                    return Err(AppError::system("circuit.open", "circuit breaker is open")
                        .with_retry_after(self.timeout));
                }
                tracing::debug!("circuit breaker transitioning open -> half-open");
                guard.state = State::HalfOpen;
            }
        }

        match f().await {
            Ok(value) => {
                let mut guard = self.inner.lock();
                guard.state = State::Closed;
                guard.failure_count = 0;
                Ok(value)
            }
            Err(err) => {
                let mut guard = self.inner.lock();
                guard.failure_count += 1;
                guard.last_failure_epoch_ms = self.clock.epoch_ms();
                if guard.failure_count >= self.max_failures {
                    tracing::warn!(failures = guard.failure_count, "circuit breaker tripped open");
                    guard.state = State::Open;
                }
                Err(err)
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().state == State::Open
    }

    pub fn failure_count(&self) -> u32 {
        self.inner.lock().failure_count
    }
}

#[cfg(test)]
#[path = "circuit_breaker_tests.rs"]
mod tests;
