// SPDX-License-Identifier: MIT

//! Retry Manager (C1): execute a thunk with bounded retries, exponential
//! backoff, jitter, and cancellation (spec §4.1).

use mcpweaver_core::{AppError, Clock};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Retry policy (spec §4.1).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter_enabled: bool,
    pub retryable_errors: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter_enabled: true,
            retryable_errors: Vec::new(),
        }
    }
}

impl RetryPolicy {
    mcpweaver_core::setters! {
        set {
            max_retries: u32,
            initial_delay: Duration,
            max_delay: Duration,
            backoff_multiplier: f64,
            jitter_enabled: bool,
            retryable_errors: Vec<String>,
        }
    }

    /// An error is retryable if it's a typed recoverable error whose code
    /// is in `retryable_errors`, or its text matches a known transient
    /// substring (spec §4.1 "Retryability").
    pub fn is_retryable(&self, err: &AppError) -> bool {
        if err.recoverable && self.retryable_errors.iter().any(|c| c == &err.code) {
            return true;
        }
        err.looks_transient()
    }
}

/// Outcome of a retry loop (spec §4.1 "Result").
#[derive(Debug, Clone)]
pub struct RetryResult<T> {
    pub success: bool,
    pub value: Option<T>,
    pub attempts: u32,
    pub last_error: Option<AppError>,
    pub total_delay: Duration,
    pub start_time: u64,
    pub end_time: u64,
}

impl<T> RetryResult<T> {
    pub fn into_result(self) -> Result<T, AppError> {
        match self.value {
            Some(v) if self.success => Ok(v),
            _ => Err(self.last_error.unwrap_or_else(|| {
                AppError::system("retry.exhausted", "retry loop exhausted with no recorded error")
            })),
        }
    }
}

/// Execute `f` under `policy`, retrying on retryable failures with
/// exponential backoff and optional jitter. Sleeps are cancellation-aware:
/// cancelling `cancel` aborts the wait immediately and the cancellation
/// becomes the final error.
pub async fn retry<T, C, F, Fut>(
    policy: &RetryPolicy,
    clock: &C,
    cancel: &CancellationToken,
    mut f: F,
) -> RetryResult<T>
where
    C: Clock,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let start_time = clock.epoch_ms();
    let mut delay = policy.initial_delay;
    let mut total_delay = Duration::ZERO;
    let mut last_error: Option<AppError> = None;

    for attempt in 1..=policy.max_retries + 1 {
        if cancel.is_cancelled() {
            let err = AppError::system("retry.cancelled", "retry cancelled before attempt");
            return RetryResult {
                success: false,
                value: None,
                attempts: attempt - 1,
                last_error: Some(err),
                total_delay,
                start_time,
                end_time: clock.epoch_ms(),
            };
        }

        match f().await {
            Ok(value) => {
                return RetryResult {
                    success: true,
                    value: Some(value),
                    attempts: attempt,
                    last_error: None,
                    total_delay,
                    start_time,
                    end_time: clock.epoch_ms(),
                };
            }
            Err(err) => {
                let retryable = policy.is_retryable(&err);
                tracing::debug!(attempt, retryable, code = %err.code, "retry attempt failed");
                last_error = Some(err);
                if !retryable || attempt == policy.max_retries + 1 {
                    return RetryResult {
                        success: false,
                        value: None,
                        attempts: attempt,
                        last_error,
                        total_delay,
                        start_time,
                        end_time: clock.epoch_ms(),
                    };
                }

                let sleep_for = apply_jitter(delay.min(policy.max_delay), policy.jitter_enabled);
                tokio::select! {
                    _ = tokio::time::sleep(sleep_for) => {
                        total_delay += sleep_for;
                    }
                    _ = cancel.cancelled() => {
                        let err = AppError::system("retry.cancelled", "retry cancelled during backoff sleep");
                        return RetryResult {
                            success: false,
                            value: None,
                            attempts: attempt,
                            last_error: Some(err),
                            total_delay,
                            start_time,
                            end_time: clock.epoch_ms(),
                        };
                    }
                }

                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * policy.backoff_multiplier).min(policy.max_delay.as_secs_f64()),
                );
            }
        }
    }

    // Unreachable: the loop always returns, but keep the compiler happy.
    RetryResult {
        success: false,
        value: None,
        attempts: policy.max_retries + 1,
        last_error,
        total_delay,
        start_time,
        end_time: clock.epoch_ms(),
    }
}

fn apply_jitter(delay: Duration, jitter_enabled: bool) -> Duration {
    if !jitter_enabled {
        return delay;
    }
    let max_jitter = delay.mul_f64(0.1);
    if max_jitter.is_zero() {
        return delay;
    }
    let jitter = rand::thread_rng().gen_range(0.0..=max_jitter.as_secs_f64());
    delay + Duration::from_secs_f64(jitter)
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
