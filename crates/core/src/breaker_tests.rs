// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use crate::clock::ManualClock;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("backend said no: {0}")]
struct BackendError(u16);

fn breaker(clock: &Arc<ManualClock>) -> CircuitBreaker {
    let config = BreakerConfig { failure_threshold: 3, reset_timeout_ms: 1000, success_threshold: 2 };
    CircuitBreaker::with_clock("backend", config, clock.clone())
}

async fn fail(b: &CircuitBreaker) -> Result<(), BreakerError<BackendError>> {
    b.execute(|| async { Err::<(), _>(BackendError(503)) }).await
}

async fn succeed(b: &CircuitBreaker) -> Result<u32, BreakerError<BackendError>> {
    b.execute(|| async { Ok::<_, BackendError>(7) }).await
}

#[tokio::test]
async fn trips_open_after_threshold_and_fails_fast() {
    let clock = Arc::new(ManualClock::new(10_000));
    let b = breaker(&clock);

    for _ in 0..3 {
        let err = fail(&b).await.unwrap_err();
        assert!(matches!(err, BreakerError::Inner(BackendError(503))));
    }
    assert_eq!(b.state(), CircuitState::Open);

    let calls = AtomicUsize::new(0);
    let err = b
        .execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BackendError>(())
        })
        .await
        .unwrap_err();

    assert!(err.is_open());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn open_error_reports_remaining_cooldown() {
    let clock = Arc::new(ManualClock::new(10_000));
    let b = breaker(&clock);
    for _ in 0..3 {
        let _ = fail(&b).await;
    }

    clock.advance(400);
    let err = succeed(&b).await.unwrap_err();
    match err {
        BreakerError::Open { name, retry_in_ms } => {
            assert_eq!(name, "backend");
            assert_eq!(retry_in_ms, 600);
        }
        other => panic!("expected open, got {other:?}"),
    }
    assert_eq!(b.retry_in_ms(), 600);
}

#[tokio::test]
async fn half_open_after_cooldown_then_closes_after_two_successes() {
    let clock = Arc::new(ManualClock::new(10_000));
    let b = breaker(&clock);
    for _ in 0..3 {
        let _ = fail(&b).await;
    }

    clock.advance(1000);

    let observed = std::sync::Mutex::new(None);
    let value = b
        .execute(|| async {
            *observed.lock().unwrap() = Some(b.state());
            Ok::<_, BackendError>(1)
        })
        .await
        .unwrap();
    assert_eq!(value, 1);
    assert_eq!(*observed.lock().unwrap(), Some(CircuitState::HalfOpen));
    assert_eq!(b.state(), CircuitState::HalfOpen);
    assert_eq!(b.stats().successes, 1);

    succeed(&b).await.unwrap();
    let stats = b.stats();
    assert_eq!(stats.state, CircuitState::Closed);
    assert_eq!(stats.failures, 0);
    assert_eq!(stats.successes, 0);
}

#[tokio::test]
async fn single_half_open_failure_reopens() {
    let clock = Arc::new(ManualClock::new(10_000));
    let b = breaker(&clock);
    for _ in 0..3 {
        let _ = fail(&b).await;
    }

    clock.advance(1000);
    succeed(&b).await.unwrap();
    assert_eq!(b.state(), CircuitState::HalfOpen);

    let err = fail(&b).await.unwrap_err();
    assert!(matches!(err, BreakerError::Inner(_)));
    let stats = b.stats();
    assert_eq!(stats.state, CircuitState::Open);
    assert_eq!(stats.successes, 0);
    assert_eq!(stats.last_failure_time, Some(11_000));

    // Cooldown restarts from the probe failure.
    assert!(succeed(&b).await.unwrap_err().is_open());
}

#[tokio::test]
async fn success_while_closed_resets_failures() {
    let clock = Arc::new(ManualClock::new(0));
    let b = breaker(&clock);

    let _ = fail(&b).await;
    let _ = fail(&b).await;
    assert_eq!(b.stats().failures, 2);

    succeed(&b).await.unwrap();
    assert_eq!(b.stats().failures, 0);

    // Non-consecutive failures never trip.
    let _ = fail(&b).await;
    let _ = fail(&b).await;
    assert_eq!(b.state(), CircuitState::Closed);
}

#[tokio::test]
async fn inner_error_is_never_swallowed() {
    let clock = Arc::new(ManualClock::new(0));
    let b = breaker(&clock);

    let err = b.execute(|| async { Err::<(), _>(BackendError(418)) }).await.unwrap_err();
    assert_eq!(err.to_string(), "backend said no: 418");
    assert_eq!(err.into_inner(), Some(BackendError(418)));
}

#[tokio::test]
async fn reset_closes_open_breaker() {
    let clock = Arc::new(ManualClock::new(0));
    let b = breaker(&clock);
    for _ in 0..3 {
        let _ = fail(&b).await;
    }

    b.reset();
    assert_eq!(b.state(), CircuitState::Closed);
    assert_eq!(succeed(&b).await.unwrap(), 7);
}

#[test]
fn zero_thresholds_are_clamped() {
    let config = BreakerConfig { failure_threshold: 0, reset_timeout_ms: 5, success_threshold: 0 };
    let b = CircuitBreaker::new("x", config);
    assert_eq!(b.config().failure_threshold, 1);
    assert_eq!(b.config().success_threshold, 1);
}

#[test]
fn open_error_maps_to_crate_error() {
    let err: BreakerError<BackendError> =
        BreakerError::Open { name: "backend".into(), retry_in_ms: 10 };
    assert!(matches!(err.open_error(), Some(Error::CircuitOpen { retry_in_ms: 10, .. })));

    let inner: BreakerError<BackendError> = BreakerError::Inner(BackendError(1));
    assert!(inner.open_error().is_none());
}

#[test]
fn state_serializes_kebab_case() {
    let json = serde_json::to_string(&CircuitState::HalfOpen).unwrap();
    assert_eq!(json, "\"half-open\"");
}
