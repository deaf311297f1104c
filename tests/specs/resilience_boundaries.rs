//! Retry Manager / Circuit Breaker / Bulkhead: the boundary behaviours and
//! invariants called out in spec §8, exercised directly against the
//! resilience primitives rather than through a specific subsystem.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mcpweaver_core::{AppError, FakeClock};
use mcpweaver_resilience::{retry, Bulkhead, CircuitBreaker, RetryPolicy};
use tokio_util::sync::CancellationToken;

/// RM invariant: with `MaxRetries=0`, `fn` is invoked exactly once, even
/// when it always fails.
#[tokio::test]
async fn max_retries_zero_invokes_fn_exactly_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy::default().max_retries(0);
    let clock = FakeClock::new();
    let cancel = CancellationToken::new();

    let calls2 = calls.clone();
    let result = retry(&policy, &clock, &cancel, || {
        let calls = calls2.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), AppError>(AppError::network("transport.refused", "connection refused"))
        }
    })
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!result.success);
    assert_eq!(result.attempts, 1);
}

/// RM invariant: on eventual success, `last_error` is cleared and the
/// number of invocations never exceeds `MaxRetries + 1`.
#[tokio::test]
async fn retry_succeeds_within_budget_and_clears_last_error() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy::default().max_retries(3).initial_delay(Duration::from_millis(1)).jitter_enabled(false);
    let clock = FakeClock::new();
    let cancel = CancellationToken::new();

    let calls2 = calls.clone();
    let result = retry(&policy, &clock, &cancel, || {
        let calls = calls2.clone();
        async move {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt < 3 {
                Err(AppError::network("transport.refused", "connection refused"))
            } else {
                Ok(42)
            }
        }
    })
    .await;

    assert!(result.success);
    assert_eq!(result.value, Some(42));
    assert!(result.last_error.is_none());
    assert!(calls.load(Ordering::SeqCst) <= policy.max_retries + 1);
}

/// CB boundary: with a zero timeout, Open transitions to HalfOpen on the
/// very next call (spec §8 "Boundary behaviours").
#[tokio::test]
async fn zero_timeout_circuit_half_opens_immediately() {
    let clock = FakeClock::new();
    let breaker = CircuitBreaker::new(clock, 1, Duration::from_secs(0));

    let first = breaker.execute(|| async { Err::<(), AppError>(AppError::network("x", "boom")) }).await;
    assert!(first.is_err());
    assert!(breaker.is_open());

    // No time needs to pass at all: the very next call re-probes.
    let second = breaker.execute(|| async { Ok::<_, AppError>(()) }).await;
    assert!(second.is_ok());
    assert!(!breaker.is_open());
}

/// Bulkhead: a resource with no configured limit bypasses entirely; a
/// resource at capacity rejects a call that can't acquire a permit before
/// cancellation.
#[tokio::test]
async fn unconfigured_resource_bypasses_the_bulkhead() {
    let bulkhead = Bulkhead::new();
    let cancel = CancellationToken::new();
    let result = bulkhead.execute(&cancel, "unconfigured", || async { Ok::<_, AppError>(7) }).await;
    assert_eq!(result.unwrap(), 7);
}

#[tokio::test]
async fn bulkhead_rejects_when_cancelled_while_waiting_for_a_permit() {
    let bulkhead = Arc::new(Bulkhead::new());
    bulkhead.set_limit("db", 1);

    // Occupy the single permit for the duration of the test by holding it
    // inside a long-running call on its own cancellation token.
    let holder_cancel = CancellationToken::new();
    let holder_bulkhead = bulkhead.clone();
    let holder = tokio::spawn(async move {
        let _ = holder_bulkhead
            .execute(&holder_cancel, "db", || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, AppError>(())
            })
            .await;
    });
    // Let the holder acquire its permit before the waiter races in.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let waiter_cancel = CancellationToken::new();
    let waiter_cancel_for_task = waiter_cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waiter_cancel_for_task.cancel();
    });

    let result = bulkhead.execute(&waiter_cancel, "db", || async { Ok::<_, AppError>(()) }).await;
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().code, "bulkhead.cancelled");

    holder.abort();
}
