use crate::config::RateLimits;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, Instant};
use tracing::{debug, info};

/// Sliding-window admission control for outbound API calls.
///
/// Every admitted call is recorded at the time it is let through. History is
/// pruned from the front while the span between the oldest and newest entry
/// reaches the window, so pruning is relative to the most recent call rather
/// than to the wall clock. Once the retained history holds `max_calls` entries
/// or more, admission waits for `window - span` before letting the call through.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_calls: usize,
    history: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_calls` per `window`. A `max_calls` of
    /// zero is treated as one.
    #[must_use]
    pub fn new(max_calls: u32, window: Duration) -> Self {
        let max_calls = usize::try_from(max_calls.max(1)).unwrap_or(usize::MAX);
        Self {
            window,
            max_calls,
            history: Mutex::new(VecDeque::with_capacity(max_calls.min(4096))),
        }
    }

    /// Create a limiter from configured limits, splitting the quota between workers
    #[must_use]
    pub fn from_limits(limits: &RateLimits) -> Self {
        Self::new(limits.max_calls(), limits.window())
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    #[must_use]
    pub const fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Wait until one more call fits in the window, then return.
    ///
    /// The history lock is held while sleeping, so callers sharing a limiter
    /// are admitted one at a time.
    pub async fn admit(&self) {
        let mut history = self.history.lock().await;
        let delay = Self::apply(&mut history, Instant::now(), self.window, self.max_calls);
        if delay.is_zero() {
            debug!(retained = history.len(), "Call admitted");
            return;
        }

        info!(
            "Rate limit reached ({} calls in {}s window), waiting {:.3}s",
            history.len(),
            self.window.as_secs(),
            delay.as_secs_f64()
        );
        time::sleep(delay).await;
        if let Some(released) = history.back_mut() {
            *released = Instant::now();
        }
    }

    /// Record a call made at `now` and return how long it has to wait.
    ///
    /// This is the bookkeeping half of [`RateLimiter::admit`], without sleeping.
    /// The entry keeps the arrival time; `admit` moves it to the release time.
    pub fn record(&mut self, now: Instant) -> Duration {
        Self::apply(self.history.get_mut(), now, self.window, self.max_calls)
    }

    fn apply(
        history: &mut VecDeque<Instant>,
        now: Instant,
        window: Duration,
        max_calls: usize,
    ) -> Duration {
        history.push_back(now);

        while let (Some(&oldest), Some(&newest)) = (history.front(), history.back()) {
            // An entry exactly one window old no longer shares a window with the newest
            if newest.saturating_duration_since(oldest) < window {
                break;
            }
            history.pop_front();
        }

        if history.len() < max_calls {
            return Duration::ZERO;
        }

        match (history.front(), history.back()) {
            (Some(&oldest), Some(&newest)) => {
                window.saturating_sub(newest.saturating_duration_since(oldest))
            }
            _ => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_first_call_is_free() {
        let mut limiter = RateLimiter::new(5, secs(10));
        assert_eq!(limiter.record(Instant::now()), Duration::ZERO);
        assert_eq!(limiter.history.get_mut().len(), 1);
    }

    #[test]
    fn test_zero_max_calls_is_raised_to_one() {
        let limiter = RateLimiter::new(0, secs(10));
        assert_eq!(limiter.max_calls(), 1);
    }

    #[test]
    fn test_from_limits() {
        let limits = RateLimits {
            quota: 1200,
            period_seconds: 300,
            workers: 3,
        };
        let limiter = RateLimiter::from_limits(&limits);
        assert_eq!(limiter.max_calls(), 400);
        assert_eq!(limiter.window(), secs(300));
    }

    #[test]
    fn test_prunes_by_span_from_newest() {
        let mut limiter = RateLimiter::new(10, secs(10));
        let start = Instant::now();

        limiter.record(start);
        limiter.record(start + secs(4));
        limiter.record(start + secs(9));
        assert_eq!(limiter.history.get_mut().len(), 3);

        // 11s after the first entry: only the first one falls outside the span
        limiter.record(start + secs(11));
        let history = limiter.history.get_mut();
        assert_eq!(history.len(), 3);
        assert_eq!(history.front(), Some(&(start + secs(4))));
    }

    #[test]
    fn test_span_equal_to_window_is_pruned() {
        let mut limiter = RateLimiter::new(10, secs(10));
        let start = Instant::now();

        limiter.record(start);
        limiter.record(start + secs(9));
        assert_eq!(limiter.history.get_mut().len(), 2);

        limiter.record(start + secs(10));
        let history = limiter.history.get_mut();
        assert_eq!(history.len(), 2);
        assert_eq!(history.front(), Some(&(start + secs(9))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_admit_records_release_time() {
        let limiter = RateLimiter::new(2, secs(10));
        let start = Instant::now();

        limiter.admit().await;
        limiter.admit().await;

        let history = limiter.history.lock().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history.front(), Some(&start));
        assert!(history.back().is_some_and(|&released| released >= start + secs(10)));
    }

    #[test]
    fn test_delay_formula() {
        let mut limiter = RateLimiter::new(2, secs(10));
        let start = Instant::now();

        assert_eq!(limiter.record(start), Duration::ZERO);
        // Two retained calls reach the maximum: wait out the rest of the window
        assert_eq!(limiter.record(start + secs(1)), secs(9));
        assert_eq!(limiter.record(start + secs(2)), secs(8));
    }

    #[test]
    fn test_delay_after_old_calls_expire() {
        let mut limiter = RateLimiter::new(2, secs(10));
        let start = Instant::now();

        limiter.record(start);
        assert_eq!(limiter.record(start + secs(1)), secs(9));
        // Both earlier calls are more than 10s older than this one
        assert_eq!(limiter.record(start + secs(20)), Duration::ZERO);
        assert_eq!(limiter.history.get_mut().len(), 1);
    }
}
