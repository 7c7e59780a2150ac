use std::sync::Arc;
use std::time::Duration;

use cfctl::config::RateLimits;
use cfctl::RateLimiter;
use tokio::time::{self, Instant};

// Paused-clock sleeps land on the timer's millisecond ticks
fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + Duration::from_millis(5),
        "expected about {expected:?}, got {actual:?}"
    );
}

// Test fixtures
fn create_test_rate_limiter() -> RateLimiter {
    RateLimiter::new(2, Duration::from_secs(10))
}

#[tokio::test(start_paused = true)]
async fn test_first_admission_does_not_wait() {
    let limiter = RateLimiter::new(5, Duration::from_secs(10));
    let start = Instant::now();

    limiter.admit().await;

    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_admission_waits_when_window_is_full() {
    let limiter = create_test_rate_limiter();
    let start = Instant::now();

    limiter.admit().await;
    time::advance(Duration::from_secs(1)).await;
    limiter.admit().await;

    // Two calls one second apart fill the window: wait 10 - 1 seconds
    assert_close(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_admission_resumes_after_window() {
    let limiter = create_test_rate_limiter();

    limiter.admit().await;
    time::advance(Duration::from_secs(11)).await;

    let before = Instant::now();
    limiter.admit().await;
    assert_eq!(before.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_are_serialized() {
    let limiter = Arc::new(RateLimiter::new(3, Duration::from_secs(30)));
    let start = Instant::now();

    let mut handles = Vec::new();
    for _ in 0..3 {
        let limiter = Arc::clone(&limiter);
        handles.push(tokio::spawn(async move {
            limiter.admit().await;
            Instant::now()
        }));
    }

    let mut admitted = Vec::new();
    for handle in handles {
        admitted.push(handle.await.unwrap());
    }
    admitted.sort();

    // The third caller fills the window and waits for all of it
    assert_eq!(admitted[0], start);
    assert_eq!(admitted[1], start);
    assert_close(admitted[2] - start, Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_admissions_stay_within_quota() {
    let limiter = create_test_rate_limiter();
    let window = limiter.window();
    let start = Instant::now();

    let mut released = Vec::new();
    for _ in 0..6 {
        limiter.admit().await;
        released.push(start.elapsed());
    }

    for (i, &expected) in [0, 10, 20, 30, 40, 50].iter().enumerate() {
        assert_close(released[i], Duration::from_secs(expected));
    }
    for &end in &released {
        let in_window = released
            .iter()
            .filter(|&&t| t <= end && t + window > end)
            .count();
        assert!(in_window <= 2, "{in_window} calls in the window ending at {end:?}");
    }
}

#[test]
fn test_record_matches_delay_formula() {
    let mut limiter = create_test_rate_limiter();
    let start = Instant::now();

    assert_eq!(limiter.record(start), Duration::ZERO);
    assert_eq!(
        limiter.record(start + Duration::from_secs(1)),
        Duration::from_secs(9)
    );
    // Third call at t=2 while t=0 and t=1 are retained: 10 - (2 - 0)
    assert_eq!(
        limiter.record(start + Duration::from_secs(2)),
        Duration::from_secs(8)
    );
}

#[test]
fn test_limiter_from_default_limits() {
    let limiter = RateLimiter::from_limits(&RateLimits::default());
    assert_eq!(limiter.max_calls(), 1200);
    assert_eq!(limiter.window(), Duration::from_secs(300));
}
