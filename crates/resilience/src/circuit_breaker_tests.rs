use super::*;
use mcpweaver_core::FakeClock;

async fn fail() -> Result<(), AppError> {
    Err(AppError::network("boom", "connection refused"))
}

async fn ok() -> Result<(), AppError> {
    Ok(())
}

#[tokio::test]
async fn closed_allows_calls_and_counts_failures() {
    let cb = CircuitBreaker::new(FakeClock::new(), 3, Duration::from_secs(30));
    assert!(cb.execute(fail).await.is_err());
    assert!(!cb.is_open());
    assert_eq!(cb.failure_count(), 1);
}

#[tokio::test]
async fn trips_open_after_threshold_failures() {
    let cb = CircuitBreaker::new(FakeClock::new(), 2, Duration::from_secs(30));
    assert!(cb.execute(fail).await.is_err());
    assert!(cb.execute(fail).await.is_err());
    assert!(cb.is_open());
}

#[tokio::test]
async fn open_rejects_with_recoverable_retry_after() {
    let cb = CircuitBreaker::new(FakeClock::new(), 1, Duration::from_secs(30));
    assert!(cb.execute(fail).await.is_err());
    assert!(cb.is_open());

    let err = cb.execute(ok).await.unwrap_err();
    assert_eq!(err.code, "circuit.open");
    assert!(err.recoverable);
    assert!(err.retry_after().is_some());
}

#[tokio::test]
async fn half_open_after_timeout_then_closes_on_success() {
    let clock = FakeClock::new();
    let cb = CircuitBreaker::new(clock.clone(), 1, Duration::from_secs(10));
    assert!(cb.execute(fail).await.is_err());
    assert!(cb.is_open());

    clock.advance(Duration::from_secs(11));
    assert!(cb.execute(ok).await.is_ok());
    assert!(!cb.is_open());
    assert_eq!(cb.failure_count(), 0);
}

#[tokio::test]
async fn zero_timeout_half_opens_on_very_next_call() {
    let clock = FakeClock::new();
    let cb = CircuitBreaker::new(clock.clone(), 1, Duration::from_secs(0));
    assert!(cb.execute(fail).await.is_err());
    assert!(cb.is_open());

    // No time needs to pass: timeout is zero.
    assert!(cb.execute(ok).await.is_ok());
    assert!(!cb.is_open());
}

#[tokio::test]
async fn half_open_failure_reopens() {
    let clock = FakeClock::new();
    let cb = CircuitBreaker::new(clock.clone(), 1, Duration::from_secs(5));
    assert!(cb.execute(fail).await.is_err());
    clock.advance(Duration::from_secs(6));
    assert!(cb.execute(fail).await.is_err());
    assert!(cb.is_open());
}
